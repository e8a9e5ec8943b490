use alloc::string::String;

use thiserror::Error;
use tk_token::{Token, TokenKind};

// -----------------------------------------------------------------------------
// Error

/// Failure of a marshal or unmarshal step.
///
/// Once a step has returned an error the engine is abandoned; call
/// `reset` before using it again.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A struct type was reached that has no entry in the atlas.
    #[error("no machine available in atlas for struct of type {type_name}")]
    NoHandler { type_name: &'static str },

    /// A type was reached that has no traversal strategy at all.
    #[error("values of type {type_name} cannot be traversed")]
    Unsupported { type_name: &'static str },

    #[error("unexpected {found} while filling {target}; expected {expected}")]
    UnexpectedToken {
        expected: &'static str,
        found: TokenKind,
        target: &'static str,
    },

    /// A leaf token cannot be stored in the target without loss.
    #[error("cannot fit {token} into {target}")]
    CantFit { token: Token, target: &'static str },

    #[error("no field {field:?} in the atlas entry for {type_name}")]
    UnknownField {
        field: String,
        type_name: &'static str,
    },

    #[error("{type_name} holds exactly {expected} elements, found {found}")]
    LengthMismatch {
        expected: usize,
        found: usize,
        type_name: &'static str,
    },

    #[error("transform of {type_name} failed: {message}")]
    Transform {
        type_name: &'static str,
        message: String,
    },

    #[error("value nesting exceeds the limit of {0} levels")]
    DepthExceeded(usize),
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use tk_token::Token;

    use super::Error;

    #[test]
    fn messages_name_the_culprit() {
        let err = Error::NoHandler {
            type_name: "demo::BB",
        };
        assert_eq!(
            err.to_string(),
            "no machine available in atlas for struct of type demo::BB"
        );

        let err = Error::CantFit {
            token: Token::Int(-1),
            target: "u8",
        };
        assert_eq!(err.to_string(), "cannot fit <int:-1> into u8");
    }
}
