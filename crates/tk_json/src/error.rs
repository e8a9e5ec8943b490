use thiserror::Error;
use tk_token::TokenKind;

/// Failure of the JSON encoder or decoder.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The token stream is not shaped like a JSON value.
    #[error("unexpected {found}; expected {expected}")]
    UnexpectedToken {
        expected: &'static str,
        found: TokenKind,
    },

    /// A well-formed token that JSON has no representation for.
    #[error("{0} cannot be represented in JSON")]
    Unsupported(&'static str),

    #[error("invalid JSON at byte {offset}: {message}")]
    Syntax {
        offset: usize,
        message: &'static str,
    },

    #[cfg(feature = "std")]
    #[error("failed to write JSON output")]
    Io(#[from] std::io::Error),
}
