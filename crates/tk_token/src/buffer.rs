use alloc::vec::Vec;

use thiserror::Error;

use crate::{Token, TokenKind, TokenSink, TokenSource};

// -----------------------------------------------------------------------------
// BufferError

/// Error returned by the in-memory token buffers.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum BufferError {
    #[error("token stream exhausted after {0} tokens")]
    Exhausted(usize),

    #[error("unbalanced {0} at token {1}")]
    Unbalanced(TokenKind, usize),
}

// -----------------------------------------------------------------------------
// Bracket tracking

/// Tracks bracket nesting; returns whether the value is complete.
fn track(stack: &mut Vec<TokenKind>, kind: TokenKind, at: usize) -> Result<bool, BufferError> {
    match kind {
        TokenKind::MapOpen | TokenKind::ArrOpen => {
            stack.push(kind);
            Ok(false)
        }
        TokenKind::MapClose | TokenKind::ArrClose => {
            let expect = match kind {
                TokenKind::MapClose => TokenKind::MapOpen,
                _ => TokenKind::ArrOpen,
            };
            match stack.pop() {
                Some(open) if open == expect => Ok(stack.is_empty()),
                _ => Err(BufferError::Unbalanced(kind, at)),
            }
        }
        _ => Ok(stack.is_empty()),
    }
}

// -----------------------------------------------------------------------------
// TokenSliceSource

/// A [`TokenSource`] replaying a slice of tokens.
///
/// The source reports done once the first complete value has been yielded.
#[derive(Debug, Clone)]
pub struct TokenSliceSource<'a> {
    tokens: &'a [Token],
    pos: usize,
    stack: Vec<TokenKind>,
}

impl<'a> TokenSliceSource<'a> {
    /// Creates a source over `tokens`.
    #[inline]
    pub const fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            stack: Vec::new(),
        }
    }

    /// Returns the number of tokens yielded so far.
    #[inline]
    pub const fn position(&self) -> usize {
        self.pos
    }
}

impl TokenSource for TokenSliceSource<'_> {
    type Error = BufferError;

    fn step(&mut self, token: &mut Token) -> Result<bool, BufferError> {
        let Some(next) = self.tokens.get(self.pos) else {
            return Err(BufferError::Exhausted(self.pos));
        };
        let at = self.pos;
        self.pos += 1;
        token.clone_from(next);
        track(&mut self.stack, next.kind(), at)
    }
}

// -----------------------------------------------------------------------------
// TokenBuffer

/// A [`TokenSink`] recording every token it receives.
///
/// Reports done once a complete value has been recorded; a recorded
/// stream can later be replayed through [`TokenBuffer::source`].
#[derive(Debug, Clone, Default)]
pub struct TokenBuffer {
    tokens: Vec<Token>,
    stack: Vec<TokenKind>,
}

impl TokenBuffer {
    /// Creates an empty buffer.
    #[inline]
    pub const fn new() -> Self {
        Self {
            tokens: Vec::new(),
            stack: Vec::new(),
        }
    }

    /// Returns the recorded tokens.
    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Consumes the buffer, returning the recorded tokens.
    #[inline]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Returns a source replaying the recorded tokens.
    #[inline]
    pub fn source(&self) -> TokenSliceSource<'_> {
        TokenSliceSource::new(&self.tokens)
    }

    /// Forgets every recorded token.
    pub fn clear(&mut self) {
        self.tokens.clear();
        self.stack.clear();
    }
}

impl TokenSink for TokenBuffer {
    type Error = BufferError;

    fn step(&mut self, token: &Token) -> Result<bool, BufferError> {
        let at = self.tokens.len();
        let done = track(&mut self.stack, token.kind(), at)?;
        self.tokens.push(token.clone());
        Ok(done)
    }
}

// -----------------------------------------------------------------------------
// Tests
