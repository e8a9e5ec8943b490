use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

// -----------------------------------------------------------------------------
// TokenKind

/// The payload-free tag of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    MapOpen,
    MapClose,
    ArrOpen,
    ArrClose,
    String,
    Bytes,
    Bool,
    Int,
    Uint,
    Float64,
    Null,
}

impl TokenKind {
    /// Returns `true` for `MapOpen` and `ArrOpen`.
    #[inline]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::MapOpen | Self::ArrOpen)
    }

    /// Returns `true` for `MapClose` and `ArrClose`.
    #[inline]
    pub const fn is_close(self) -> bool {
        matches!(self, Self::MapClose | Self::ArrClose)
    }

    /// Returns `true` for every non-bracket kind.
    #[inline]
    pub const fn is_leaf(self) -> bool {
        !self.is_open() && !self.is_close()
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MapOpen => f.pad("map open"),
            Self::MapClose => f.pad("map close"),
            Self::ArrOpen => f.pad("array open"),
            Self::ArrClose => f.pad("array close"),
            Self::String => f.pad("string"),
            Self::Bytes => f.pad("bytes"),
            Self::Bool => f.pad("bool"),
            Self::Int => f.pad("int"),
            Self::Uint => f.pad("uint"),
            Self::Float64 => f.pad("float64"),
            Self::Null => f.pad("null"),
        }
    }
}

// -----------------------------------------------------------------------------
// Token

/// One unit of the format-agnostic data stream.
///
/// `MapOpen`/`MapClose` and `ArrOpen`/`ArrClose` are structural brackets,
/// every other variant is a leaf. Inside a map, keys are always
/// [`Token::String`].
///
/// Producers usually write into one reused `Token`; [`Token::set_str`] and
/// [`Token::set_bytes`] keep the existing payload allocation when the token
/// already carries the same tag.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Token {
    MapOpen,
    MapClose,
    ArrOpen,
    ArrClose,
    String(String),
    Bytes(Vec<u8>),
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float64(f64),
    #[default]
    Null,
}

impl Token {
    /// Returns the tag of this token.
    pub const fn kind(&self) -> TokenKind {
        match self {
            Self::MapOpen => TokenKind::MapOpen,
            Self::MapClose => TokenKind::MapClose,
            Self::ArrOpen => TokenKind::ArrOpen,
            Self::ArrClose => TokenKind::ArrClose,
            Self::String(_) => TokenKind::String,
            Self::Bytes(_) => TokenKind::Bytes,
            Self::Bool(_) => TokenKind::Bool,
            Self::Int(_) => TokenKind::Int,
            Self::Uint(_) => TokenKind::Uint,
            Self::Float64(_) => TokenKind::Float64,
            Self::Null => TokenKind::Null,
        }
    }

    /// Overwrites this token with a string, reusing the buffer if possible.
    pub fn set_str(&mut self, value: &str) {
        if let Self::String(buf) = self {
            buf.clear();
            buf.push_str(value);
        } else {
            *self = Self::String(String::from(value));
        }
    }

    /// Overwrites this token with a byte string, reusing the buffer if possible.
    pub fn set_bytes(&mut self, value: &[u8]) {
        if let Self::Bytes(buf) = self {
            buf.clear();
            buf.extend_from_slice(value);
        } else {
            *self = Self::Bytes(Vec::from(value));
        }
    }

    /// Returns the string payload, if this is a [`Token::String`].
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "<string:{s:?}>"),
            Self::Bytes(b) => write!(f, "<bytes:len={}>", b.len()),
            Self::Bool(b) => write!(f, "<bool:{b}>"),
            Self::Int(i) => write!(f, "<int:{i}>"),
            Self::Uint(u) => write!(f, "<uint:{u}>"),
            Self::Float64(v) => write!(f, "<float64:{v}>"),
            other => write!(f, "<{}>", other.kind()),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Token, TokenKind};
    use alloc::string::ToString;

    #[test]
    fn set_str_reuses_buffer() {
        let mut tok = Token::String("a long enough string".into());
        let cap = match &tok {
            Token::String(s) => s.capacity(),
            _ => unreachable!(),
        };

        tok.set_str("short");
        match &tok {
            Token::String(s) => {
                assert_eq!(s, "short");
                assert_eq!(s.capacity(), cap);
            }
            _ => panic!("expected a string token"),
        }

        tok = Token::Int(3);
        tok.set_str("x");
        assert_eq!(tok, Token::String("x".into()));
    }

    #[test]
    fn kinds() {
        assert!(TokenKind::MapOpen.is_open());
        assert!(TokenKind::ArrClose.is_close());
        assert!(TokenKind::Null.is_leaf());
        assert_eq!(Token::Uint(1).kind(), TokenKind::Uint);
        assert_eq!(Token::default(), Token::Null);
    }

    #[test]
    fn display() {
        assert_eq!(Token::Int(-4).to_string(), "<int:-4>");
        assert_eq!(Token::String("s".into()).to_string(), "<string:\"s\">");
        assert_eq!(Token::MapClose.to_string(), "<map close>");
    }
}
