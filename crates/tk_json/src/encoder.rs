use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write as _;

use tk_token::{Token, TokenSink};

use crate::{ByteSink, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AnyValue,
    MapKeyOrEnd,
    MapValue,
    ArrValueOrEnd,
}

// -----------------------------------------------------------------------------
// Encoder

/// A [`TokenSink`] that writes compact JSON.
///
/// Output is written as tokens arrive; the encoder holds no more than the
/// nesting of open containers. After a complete value it is ready for the
/// next one.
///
/// # Examples
///
/// ```
/// use tk_json::Encoder;
/// use tk_token::Token;
///
/// let mut encoder = Encoder::new(Vec::new());
/// for token in [
///     Token::MapOpen,
///     Token::String("F".into()),
///     Token::Int(7),
///     Token::String("X".into()),
///     Token::String("s".into()),
///     Token::MapClose,
/// ] {
///     encoder.step(&token).unwrap();
/// }
///
/// assert_eq!(encoder.into_inner(), br#"{"F":7,"X":"s"}"#);
/// ```
#[derive(Debug)]
pub struct Encoder<W> {
    out: W,
    // Open containers, as the phase to return to after a nested value.
    stack: Vec<Phase>,
    current: Phase,
    // Whether the innermost container already holds an entry.
    some: bool,
    scratch: String,
}

impl<W: ByteSink> Encoder<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            stack: Vec::with_capacity(10),
            current: Phase::AnyValue,
            some: false,
            scratch: String::new(),
        }
    }

    /// Forgets any partially written value.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.current = Phase::AnyValue;
        self.some = false;
    }

    #[inline]
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    #[inline]
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Writes the JSON for `token`; returns `true` when a top-level value
    /// is complete.
    pub fn step(&mut self, token: &Token) -> Result<bool, Error> {
        match self.current {
            Phase::AnyValue => match token {
                Token::MapOpen | Token::ArrOpen => self.open(token),
                Token::MapClose | Token::ArrClose => Err(unexpected("start of value", token)),
                _ => {
                    self.leaf(token)?;
                    Ok(true)
                }
            },
            Phase::MapKeyOrEnd => match token {
                Token::MapClose => {
                    self.out.write_bytes(b"}")?;
                    Ok(self.close())
                }
                Token::String(key) => {
                    self.separate()?;
                    write_string(&mut self.out, key)?;
                    self.out.write_bytes(b":")?;
                    self.current = Phase::MapValue;
                    Ok(false)
                }
                _ => Err(unexpected("map key or end of map", token)),
            },
            Phase::MapValue => match token {
                Token::MapOpen | Token::ArrOpen => {
                    self.current = Phase::MapKeyOrEnd;
                    self.open(token)
                }
                Token::MapClose | Token::ArrClose => Err(unexpected("start of value", token)),
                _ => {
                    self.leaf(token)?;
                    self.current = Phase::MapKeyOrEnd;
                    Ok(false)
                }
            },
            Phase::ArrValueOrEnd => match token {
                Token::ArrClose => {
                    self.out.write_bytes(b"]")?;
                    Ok(self.close())
                }
                Token::MapClose => Err(unexpected("start of value or end of array", token)),
                Token::MapOpen | Token::ArrOpen => {
                    self.separate()?;
                    self.open(token)
                }
                _ => {
                    self.separate()?;
                    self.leaf(token)?;
                    Ok(false)
                }
            },
        }
    }

    fn open(&mut self, token: &Token) -> Result<bool, Error> {
        if !matches!(self.current, Phase::AnyValue) {
            self.stack.push(self.current);
        }
        self.current = match token {
            Token::MapOpen => {
                self.out.write_bytes(b"{")?;
                Phase::MapKeyOrEnd
            }
            _ => {
                self.out.write_bytes(b"[")?;
                Phase::ArrValueOrEnd
            }
        };
        self.some = false;
        Ok(false)
    }

    // Returns `true` once the outermost container is closed.
    fn close(&mut self) -> bool {
        match self.stack.pop() {
            Some(parent) => {
                self.current = parent;
                self.some = true;
                false
            }
            None => {
                self.current = Phase::AnyValue;
                self.some = false;
                true
            }
        }
    }

    fn separate(&mut self) -> Result<(), Error> {
        if self.some {
            self.out.write_bytes(b",")?;
        }
        self.some = true;
        Ok(())
    }

    fn leaf(&mut self, token: &Token) -> Result<(), Error> {
        match token {
            Token::String(v) => write_string(&mut self.out, v),
            Token::Bool(true) => self.out.write_bytes(b"true"),
            Token::Bool(false) => self.out.write_bytes(b"false"),
            Token::Null => self.out.write_bytes(b"null"),
            Token::Int(v) => self.formatted(format_args!("{v}")),
            Token::Uint(v) => self.formatted(format_args!("{v}")),
            Token::Float64(v) if v.is_finite() => self.formatted(format_args!("{v:?}")),
            Token::Float64(_) => Err(Error::Unsupported("a non-finite float")),
            Token::Bytes(_) => Err(Error::Unsupported("a byte string")),
            Token::MapOpen | Token::MapClose | Token::ArrOpen | Token::ArrClose => {
                unreachable!("brackets are handled by the phase machine")
            }
        }
    }

    fn formatted(&mut self, args: core::fmt::Arguments<'_>) -> Result<(), Error> {
        self.scratch.clear();
        // Writing into a `String` cannot fail.
        let _ = self.scratch.write_fmt(args);
        self.out.write_bytes(self.scratch.as_bytes())
    }
}

impl<W: ByteSink> TokenSink for Encoder<W> {
    type Error = Error;

    #[inline]
    fn step(&mut self, token: &Token) -> Result<bool, Error> {
        Encoder::step(self, token)
    }
}

fn unexpected(expected: &'static str, token: &Token) -> Error {
    Error::UnexpectedToken {
        expected,
        found: token.kind(),
    }
}

const HEX: &[u8; 16] = b"0123456789abcdef";

fn write_string<W: ByteSink + ?Sized>(out: &mut W, value: &str) -> Result<(), Error> {
    out.write_bytes(b"\"")?;

    let bytes = value.as_bytes();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let unicode;
        let escape: &[u8] = match b {
            b'"' => b"\\\"",
            b'\\' => b"\\\\",
            0x08 => b"\\b",
            0x0C => b"\\f",
            b'\n' => b"\\n",
            b'\r' => b"\\r",
            b'\t' => b"\\t",
            0x00..=0x1F => {
                unicode = [
                    b'\\',
                    b'u',
                    b'0',
                    b'0',
                    HEX[usize::from(b >> 4)],
                    HEX[usize::from(b & 0xF)],
                ];
                &unicode
            }
            _ => continue,
        };
        if start < i {
            out.write_bytes(&bytes[start..i])?;
        }
        out.write_bytes(escape)?;
        start = i + 1;
    }
    if start < bytes.len() {
        out.write_bytes(&bytes[start..])?;
    }

    out.write_bytes(b"\"")
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use tk_token::{Token, TokenKind};

    use super::Encoder;
    use crate::Error;

    fn encode(tokens: &[Token]) -> Result<String, Error> {
        let mut encoder = Encoder::new(Vec::new());
        for (i, token) in tokens.iter().enumerate() {
            let done = encoder.step(token)?;
            assert_eq!(done, i + 1 == tokens.len(), "done flag at token {i}");
        }
        Ok(String::from_utf8(encoder.into_inner()).unwrap())
    }

    fn s(v: &str) -> Token {
        Token::String(v.into())
    }

    #[test]
    fn flat_map() {
        let json = encode(&[
            Token::MapOpen,
            s("F"),
            Token::Int(7),
            s("X"),
            s("s"),
            Token::MapClose,
        ])
        .unwrap();
        assert_eq!(json, r#"{"F":7,"X":"s"}"#);
    }

    #[test]
    fn separators_per_container() {
        let json = encode(&[
            Token::ArrOpen,
            Token::ArrOpen,
            Token::ArrClose,
            Token::MapOpen,
            Token::MapClose,
            Token::ArrOpen,
            Token::Uint(1),
            Token::ArrClose,
            Token::MapOpen,
            s("a"),
            Token::ArrOpen,
            Token::Null,
            Token::Bool(false),
            Token::ArrClose,
            s("b"),
            Token::MapOpen,
            s("c"),
            Token::Int(-1),
            Token::MapClose,
            Token::MapClose,
            Token::Float64(0.5),
            Token::ArrClose,
        ])
        .unwrap();
        assert_eq!(
            json,
            r#"[[],{},[1],{"a":[null,false],"b":{"c":-1}},0.5]"#
        );

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[3]["b"]["c"], -1);
    }

    #[test]
    fn leaves_at_top_level() {
        assert_eq!(encode(&[Token::Null]).unwrap(), "null");
        assert_eq!(encode(&[Token::Uint(u64::MAX)]).unwrap(), "18446744073709551615");
        assert_eq!(encode(&[Token::Float64(1.0)]).unwrap(), "1.0");
        assert_eq!(encode(&[Token::Float64(-2.5e-8)]).unwrap(), "-2.5e-8");
    }

    #[test]
    fn strings_are_escaped() {
        let raw = "q\"b\\s/\u{8}\u{c}\n\r\t\u{1}\u{1f}é😀";
        let json = encode(&[Token::String(raw.into())]).unwrap();
        assert_eq!(json, r#""q\"b\\s/\b\f\n\r\t\u0001\u001fé😀""#);

        let parsed: String = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, raw);
    }

    #[test]
    fn encoder_is_reusable() {
        let mut encoder = Encoder::new(Vec::new());
        for token in [Token::ArrOpen, Token::Int(1), Token::ArrClose, Token::Bool(true)] {
            encoder.step(&token).unwrap();
        }
        assert_eq!(encoder.get_ref(), b"[1]true");

        encoder.step(&Token::MapOpen).unwrap();
        encoder.reset();
        encoder.get_mut().clear();
        assert!(encoder.step(&Token::Int(3)).unwrap());
        assert_eq!(encoder.into_inner(), b"3");
    }

    #[test]
    fn shape_errors() {
        let err = encode(&[Token::MapOpen, Token::Int(1)]).unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedToken {
                found: TokenKind::Int,
                ..
            }
        ));

        let err = encode(&[Token::ArrClose]).unwrap_err();
        assert!(matches!(err, Error::UnexpectedToken { .. }));

        let err = encode(&[Token::ArrOpen, Token::MapClose]).unwrap_err();
        assert!(matches!(err, Error::UnexpectedToken { .. }));

        let err = encode(&[Token::MapOpen, s("k"), Token::MapClose]).unwrap_err();
        assert!(matches!(err, Error::UnexpectedToken { .. }));
    }

    #[test]
    fn unrepresentable_leaves() {
        assert!(matches!(
            encode(&[Token::Bytes(Vec::from(*b"x"))]),
            Err(Error::Unsupported(_))
        ));
        assert!(matches!(
            encode(&[Token::Float64(f64::NAN)]),
            Err(Error::Unsupported(_))
        ));
    }

    #[cfg(feature = "std")]
    #[test]
    fn io_sink() {
        let mut encoder = Encoder::new(crate::IoSink(std::io::Cursor::new(Vec::new())));
        for token in [Token::ArrOpen, s("a"), s("b"), Token::ArrClose] {
            encoder.step(&token).unwrap();
        }
        let written = encoder.into_inner().into_inner().into_inner();
        assert_eq!(written, br#"["a","b"]"#);
    }
}
