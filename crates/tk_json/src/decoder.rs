use alloc::string::String;
use alloc::vec::Vec;

use tk_token::{Token, TokenSource};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Map,
    Arr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AnyValue,
    MapKeyOrEnd { first: bool },
    MapValue,
    ArrValueOrEnd { first: bool },
}

// -----------------------------------------------------------------------------
// Decoder

/// A [`TokenSource`] reading one JSON document from memory.
///
/// Integers without a fraction or exponent become [`Token::Int`], or
/// [`Token::Uint`] above `i64::MAX`; every other number is a
/// [`Token::Float64`]. Only whitespace may follow the top-level value.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    input: &'a [u8],
    pos: usize,
    stack: Vec<Container>,
    current: Phase,
}

impl<'a> Decoder<'a> {
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            stack: Vec::new(),
            current: Phase::AnyValue,
        }
    }

    /// Byte offset of the next unread input.
    #[inline]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Reads the next token into `token`; returns `true` when it completes
    /// the document.
    pub fn step(&mut self, token: &mut Token) -> Result<bool, Error> {
        self.skip_whitespace();
        match self.current {
            Phase::AnyValue => self.value(token),
            Phase::MapValue => {
                self.current = Phase::MapKeyOrEnd { first: false };
                self.value(token)
            }
            Phase::MapKeyOrEnd { first } => {
                if self.eat(b'}') {
                    *token = Token::MapClose;
                    return self.close();
                }
                if !first {
                    self.expect(b',', "expected ',' or '}'")?;
                    self.skip_whitespace();
                }
                if self.peek() != Some(b'"') {
                    return Err(self.syntax("expected a string key"));
                }
                self.string(token)?;
                self.skip_whitespace();
                self.expect(b':', "expected ':' after a key")?;
                self.current = Phase::MapValue;
                Ok(false)
            }
            Phase::ArrValueOrEnd { first } => {
                if self.eat(b']') {
                    *token = Token::ArrClose;
                    return self.close();
                }
                if !first {
                    self.expect(b',', "expected ',' or ']'")?;
                    self.skip_whitespace();
                }
                self.current = Phase::ArrValueOrEnd { first: false };
                self.value(token)
            }
        }
    }

    // Reads the start of a value. The current phase already names what
    // follows a leaf.
    fn value(&mut self, token: &mut Token) -> Result<bool, Error> {
        match self.peek() {
            None => Err(self.syntax("unexpected end of input")),
            Some(b'{') => {
                self.pos += 1;
                *token = Token::MapOpen;
                self.open(Container::Map)
            }
            Some(b'[') => {
                self.pos += 1;
                *token = Token::ArrOpen;
                self.open(Container::Arr)
            }
            Some(b'"') => {
                self.string(token)?;
                self.leaf_done()
            }
            Some(b't') => self.literal(b"true", Token::Bool(true), token),
            Some(b'f') => self.literal(b"false", Token::Bool(false), token),
            Some(b'n') => self.literal(b"null", Token::Null, token),
            Some(b'-' | b'0'..=b'9') => {
                *token = self.number()?;
                self.leaf_done()
            }
            Some(_) => Err(self.syntax("expected a value")),
        }
    }

    fn open(&mut self, container: Container) -> Result<bool, Error> {
        self.stack.push(container);
        self.current = match container {
            Container::Map => Phase::MapKeyOrEnd { first: true },
            Container::Arr => Phase::ArrValueOrEnd { first: true },
        };
        Ok(false)
    }

    fn close(&mut self) -> Result<bool, Error> {
        self.stack.pop();
        match self.stack.last() {
            Some(Container::Map) => {
                self.current = Phase::MapKeyOrEnd { first: false };
                Ok(false)
            }
            Some(Container::Arr) => {
                self.current = Phase::ArrValueOrEnd { first: false };
                Ok(false)
            }
            None => self.finish(),
        }
    }

    fn leaf_done(&mut self) -> Result<bool, Error> {
        if self.stack.is_empty() {
            self.finish()
        } else {
            Ok(false)
        }
    }

    fn finish(&mut self) -> Result<bool, Error> {
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(self.syntax("trailing characters after the value"));
        }
        self.current = Phase::AnyValue;
        Ok(true)
    }

    fn literal(&mut self, word: &[u8], value: Token, token: &mut Token) -> Result<bool, Error> {
        if !self.input[self.pos..].starts_with(word) {
            return Err(self.syntax("invalid literal"));
        }
        self.pos += word.len();
        *token = value;
        self.leaf_done()
    }

    // -------------------------------------------------------------------------
    // Lexing

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8, message: &'static str) -> Result<(), Error> {
        if self.eat(byte) {
            Ok(())
        } else {
            Err(self.syntax(message))
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    #[inline]
    fn syntax(&self, message: &'static str) -> Error {
        Error::Syntax {
            offset: self.pos,
            message,
        }
    }

    fn number(&mut self) -> Result<Token, Error> {
        let start = self.pos;
        let mut integral = true;

        self.eat(b'-');
        match self.peek() {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => self.digits(),
            _ => return Err(self.syntax("expected a digit")),
        }
        if self.eat(b'.') {
            integral = false;
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.syntax("expected a digit after '.'"));
            }
            self.digits();
        }
        if let Some(b'e' | b'E') = self.peek() {
            self.pos += 1;
            integral = false;
            if let Some(b'+' | b'-') = self.peek() {
                self.pos += 1;
            }
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.syntax("expected a digit in the exponent"));
            }
            self.digits();
        }

        let Ok(text) = core::str::from_utf8(&self.input[start..self.pos]) else {
            unreachable!("number literals are ASCII");
        };

        if integral {
            if let Ok(v) = text.parse::<i64>() {
                return Ok(Token::Int(v));
            }
            if let Ok(v) = text.parse::<u64>() {
                return Ok(Token::Uint(v));
            }
        }
        match text.parse::<f64>() {
            Ok(v) => Ok(Token::Float64(v)),
            Err(_) => Err(Error::Syntax {
                offset: start,
                message: "invalid number",
            }),
        }
    }

    fn digits(&mut self) {
        while let Some(b'0'..=b'9') = self.peek() {
            self.pos += 1;
        }
    }

    fn string(&mut self, token: &mut Token) -> Result<(), Error> {
        // Reuse the token's buffer when it already holds a string.
        let mut buf = match core::mem::take(token) {
            Token::String(s) => s.into_bytes(),
            _ => Vec::new(),
        };
        buf.clear();

        let start = self.pos;
        self.pos += 1;
        loop {
            let run = self.pos;
            while let Some(b) = self.peek() {
                if b == b'"' || b == b'\\' || b < 0x20 {
                    break;
                }
                self.pos += 1;
            }
            buf.extend_from_slice(&self.input[run..self.pos]);

            match self.peek() {
                None => return Err(self.syntax("unterminated string")),
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    self.escape(&mut buf)?;
                }
                Some(_) => return Err(self.syntax("control character in string")),
            }
        }

        match String::from_utf8(buf) {
            Ok(s) => {
                *token = Token::String(s);
                Ok(())
            }
            Err(_) => Err(Error::Syntax {
                offset: start,
                message: "string is not valid UTF-8",
            }),
        }
    }

    fn escape(&mut self, buf: &mut Vec<u8>) -> Result<(), Error> {
        let Some(b) = self.peek() else {
            return Err(self.syntax("unterminated escape"));
        };
        self.pos += 1;
        let simple = match b {
            b'"' => b'"',
            b'\\' => b'\\',
            b'/' => b'/',
            b'b' => 0x08,
            b'f' => 0x0C,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'u' => {
                let c = self.unicode_escape()?;
                let mut utf8 = [0; 4];
                buf.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
                return Ok(());
            }
            _ => return Err(self.syntax("invalid escape")),
        };
        buf.push(simple);
        Ok(())
    }

    // Reads the hex digits after `\u`, joining surrogate pairs.
    fn unicode_escape(&mut self) -> Result<char, Error> {
        let high = self.hex4()?;
        let code = match high {
            0xD800..=0xDBFF => {
                if !self.input[self.pos..].starts_with(b"\\u") {
                    return Err(self.syntax("unpaired surrogate"));
                }
                self.pos += 2;
                let low = self.hex4()?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(self.syntax("unpaired surrogate"));
                }
                0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
            }
            0xDC00..=0xDFFF => return Err(self.syntax("unpaired surrogate")),
            _ => high,
        };
        char::from_u32(code).ok_or_else(|| self.syntax("invalid code point"))
    }

    fn hex4(&mut self) -> Result<u32, Error> {
        let mut value = 0;
        for _ in 0..4 {
            let digit = match self.peek() {
                Some(b @ b'0'..=b'9') => b - b'0',
                Some(b @ b'a'..=b'f') => b - b'a' + 10,
                Some(b @ b'A'..=b'F') => b - b'A' + 10,
                _ => return Err(self.syntax("expected four hex digits")),
            };
            value = (value << 4) | u32::from(digit);
            self.pos += 1;
        }
        Ok(value)
    }
}

impl TokenSource for Decoder<'_> {
    type Error = Error;

    #[inline]
    fn step(&mut self, token: &mut Token) -> Result<bool, Error> {
        Decoder::step(self, token)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use tk_token::Token;

    use super::Decoder;
    use crate::Error;

    fn decode(input: &str) -> Result<Vec<Token>, Error> {
        let mut decoder = Decoder::new(input.as_bytes());
        let mut token = Token::Null;
        let mut out = Vec::new();
        loop {
            let done = decoder.step(&mut token)?;
            out.push(token.clone());
            if done {
                return Ok(out);
            }
        }
    }

    fn s(v: &str) -> Token {
        Token::String(v.into())
    }

    #[test]
    fn nested_document() {
        let tokens = decode(r#" {"a": [1, -2, {}], "b" : {"c": null}, "d": [] } "#).unwrap();
        assert_eq!(
            tokens,
            [
                Token::MapOpen,
                s("a"),
                Token::ArrOpen,
                Token::Int(1),
                Token::Int(-2),
                Token::MapOpen,
                Token::MapClose,
                Token::ArrClose,
                s("b"),
                Token::MapOpen,
                s("c"),
                Token::Null,
                Token::MapClose,
                s("d"),
                Token::ArrOpen,
                Token::ArrClose,
                Token::MapClose,
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(decode("0").unwrap(), [Token::Int(0)]);
        assert_eq!(
            decode("-9223372036854775808").unwrap(),
            [Token::Int(i64::MIN)]
        );
        assert_eq!(
            decode("18446744073709551615").unwrap(),
            [Token::Uint(u64::MAX)]
        );
        assert_eq!(decode("2.5").unwrap(), [Token::Float64(2.5)]);
        assert_eq!(decode("1E3").unwrap(), [Token::Float64(1000.0)]);
        assert_eq!(
            decode("18446744073709551616").unwrap(),
            [Token::Float64(18446744073709551616.0)]
        );

        for bad in ["01", "-", "1.", ".5", "1e", "+1"] {
            assert!(decode(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn strings_and_escapes() {
        assert_eq!(
            decode(r#""a\"\\\/\b\f\n\r\té😀""#).unwrap(),
            [s("a\"\\/\u{8}\u{c}\n\r\t\u{e9}\u{1f600}")]
        );
        assert!(matches!(
            decode(r#""\ud83d""#),
            Err(Error::Syntax {
                message: "unpaired surrogate",
                ..
            })
        ));
        assert!(decode("\"tab\there\"").is_err());
        assert!(decode(r#""open"#).is_err());
    }

    #[test]
    fn errors_carry_offsets() {
        let err = decode("[1 2]").unwrap_err();
        assert!(matches!(err, Error::Syntax { offset: 3, .. }));

        let err = decode("{} x").unwrap_err();
        assert!(matches!(err, Error::Syntax { offset: 3, .. }));

        let err = decode(r#"{"a" 1}"#).unwrap_err();
        assert!(matches!(err, Error::Syntax { offset: 5, .. }));

        assert!(decode("[1,]").is_err());
        assert!(decode("{,}").is_err());
        assert!(decode("tru").is_err());
        assert!(decode("").is_err());
    }
}
