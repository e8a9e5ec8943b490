//! Value-to-token traversal.

mod machine;

use tk_reflect::{Reflect, TypeInfo};
use tk_token::{Token, TokenSource};

use self::machine::MarshalRow;
use crate::atlas::Atlas;
use crate::error::Error;
use crate::options::Options;
use crate::resolve::resolve;
use crate::slab::{Outcome, Slab};

// -----------------------------------------------------------------------------
// Marshaller

/// Walks a value and produces its token stream, one token per step.
///
/// The marshaller borrows the value for its whole lifetime and never
/// modifies it. It is a [`TokenSource`], so it can be pumped straight into
/// any sink.
///
/// # Examples
///
/// ```
/// use tk_obj::{Atlas, Marshaller};
/// use tk_reflect::impl_reflect_struct;
/// use tk_token::Token;
///
/// #[derive(Default)]
/// struct Nn {
///     f: i64,
///     x: String,
/// }
///
/// impl_reflect_struct!(Nn { f: i64, x: String });
///
/// let atlas = Atlas::builder()
///     .struct_map::<Nn>(|m| m.field("F", "f").field("X", "x"))
///     .build()
///     .unwrap();
///
/// let value = Nn { f: 7, x: "s".into() };
/// let mut marshaller = Marshaller::new(&atlas, &value);
/// let mut token = Token::Null;
///
/// assert!(!marshaller.step(&mut token).unwrap());
/// assert_eq!(token, Token::MapOpen);
/// assert!(!marshaller.step(&mut token).unwrap());
/// assert_eq!(token, Token::String("F".into()));
/// assert!(!marshaller.step(&mut token).unwrap());
/// assert_eq!(token, Token::Int(7));
/// ```
pub struct Marshaller<'a> {
    atlas: &'a Atlas,
    root: &'a dyn Reflect,
    slab: Slab<MarshalRow<'a>>,
    started: bool,
}

impl<'a> Marshaller<'a> {
    #[inline]
    pub fn new(atlas: &'a Atlas, value: &'a dyn Reflect) -> Self {
        Self::with_options(atlas, value, Options::default())
    }

    pub fn with_options(atlas: &'a Atlas, value: &'a dyn Reflect, options: Options) -> Self {
        Self {
            atlas,
            root: value,
            slab: Slab::new("marshal", options.max_depth),
            started: false,
        }
    }

    /// Starts over on a new value, keeping the grown slab.
    pub fn reset(&mut self, value: &'a dyn Reflect) {
        self.slab.clear();
        self.root = value;
        self.started = false;
    }

    /// Current nesting depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.slab.depth()
    }

    /// Writes the next token into `token`.
    ///
    /// Returns `true` when that token completes the value.
    ///
    /// # Panics
    ///
    /// Panics if called again after the value was completed, unless the
    /// marshaller was [`reset`](Marshaller::reset) in between.
    pub fn step(&mut self, token: &mut Token) -> Result<bool, Error> {
        if !self.started {
            self.started = true;
            self.requisition(self.root.reflect_type_info())?;
        }
        assert!(!self.slab.is_empty(), "marshaller stepped after completing its value");

        loop {
            let (below, top) = self.slab.split_top();
            let value = below.iter().fold(self.root, |value, row| row.select(value));
            match top.step(value, token)? {
                Outcome::Continue => return Ok(false),
                Outcome::Done => return Ok(self.unwind()),
                Outcome::Recurse(child) => self.requisition(child)?,
            }
        }
    }

    fn requisition(&mut self, type_info: TypeInfo) -> Result<(), Error> {
        self.slab.requisition(resolve(self.atlas, type_info))?;
        Ok(())
    }

    // Pops the finished top row and every parent it finished along with it.
    fn unwind(&mut self) -> bool {
        loop {
            self.slab.release(self.slab.depth() - 1);
            if self.slab.is_empty() {
                return true;
            }
            let (_, top) = self.slab.split_top();
            if !top.child_done() {
                return false;
            }
        }
    }
}

impl TokenSource for Marshaller<'_> {
    type Error = Error;

    #[inline]
    fn step(&mut self, token: &mut Token) -> Result<bool, Error> {
        Marshaller::step(self, token)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use tk_reflect::{Reflect, Typed, Value, impl_reflect_struct};
    use tk_token::{Token, TokenBuffer, pump};

    use super::Marshaller;
    use crate::{Atlas, Error, Options};

    #[derive(Default)]
    struct Nn {
        f: i64,
        x: String,
    }

    #[derive(Default)]
    struct Aa {
        x: String,
        y: Bb,
    }

    #[derive(Default)]
    struct Bb {
        z: String,
    }

    #[derive(Default)]
    struct Holder {
        n: Option<Box<Option<Nn>>>,
        list: Vec<u16>,
        names: BTreeMap<String, bool>,
        any: Value,
    }

    #[derive(Default)]
    struct Node {
        next: Option<Box<Node>>,
    }

    #[derive(Default, Clone, Copy)]
    struct Port(u16);

    impl_reflect_struct!(Nn { f: i64, x: String });
    impl_reflect_struct!(Aa { x: String, y: Bb });
    impl_reflect_struct!(Bb { z: String });
    impl_reflect_struct!(Holder {
        n: Option<Box<Option<Nn>>>,
        list: Vec<u16>,
        names: BTreeMap<String, bool>,
        any: Value,
    });
    impl_reflect_struct!(Node { next: Option<Box<Node>> });
    tk_reflect::impl_reflect_opaque!(Port);

    fn tokens(atlas: &Atlas, value: &dyn Reflect) -> Result<Vec<Token>, Error> {
        let mut marshaller = Marshaller::new(atlas, value);
        let mut token = Token::Null;
        let mut out = Vec::new();
        loop {
            let done = marshaller.step(&mut token)?;
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
    fn flat_struct() {
        let atlas = Atlas::builder()
            .struct_map::<Nn>(|m| m.field("F", "f").field("X", "x"))
            .build()
            .unwrap();
        let value = Nn {
            f: 7,
            x: "s".into(),
        };

        assert_eq!(
            tokens(&atlas, &value).unwrap(),
            [
                Token::MapOpen,
                s("F"),
                Token::Int(7),
                s("X"),
                s("s"),
                Token::MapClose
            ]
        );
    }

    #[test]
    fn nested_struct_follows_map_order() {
        let atlas = Atlas::builder()
            .struct_map::<Aa>(|m| m.field("a.y", "y").field("a.x", "x"))
            .struct_map::<Bb>(|m| m.field("zee", "z"))
            .build()
            .unwrap();
        let value = Aa {
            x: "s".into(),
            y: Bb::default(),
        };

        assert_eq!(
            tokens(&atlas, &value).unwrap(),
            [
                Token::MapOpen,
                s("a.y"),
                Token::MapOpen,
                s("zee"),
                s(""),
                Token::MapClose,
                s("a.x"),
                s("s"),
                Token::MapClose,
            ]
        );
    }

    #[test]
    fn missing_handler_fails_where_reached() {
        let atlas = Atlas::builder()
            .struct_map::<Aa>(|m| m.field("a.y", "y").field("a.x", "x"))
            .build()
            .unwrap();
        let value = Aa::default();
        let mut marshaller = Marshaller::new(&atlas, &value);
        let mut token = Token::Null;

        assert_eq!(marshaller.step(&mut token), Ok(false));
        assert_eq!(token, Token::MapOpen);
        assert_eq!(marshaller.step(&mut token), Ok(false));
        assert_eq!(token, s("a.y"));

        let err = marshaller.step(&mut token).unwrap_err();
        assert_eq!(
            err,
            Error::NoHandler {
                type_name: Bb::type_info().name()
            }
        );
        assert!(alloc::string::ToString::to_string(&err).contains("Bb"));
    }

    #[test]
    fn map_keys_follow_each_value() {
        let atlas = Atlas::empty();
        let first: BTreeMap<String, u8> = [("b".into(), 2), ("a".into(), 1), ("c".into(), 3)].into();
        let second: BTreeMap<String, u8> = [("z".into(), 9)].into();

        let mut marshaller = Marshaller::new(&atlas, &first);
        let mut buffer = TokenBuffer::new();
        pump(&mut marshaller, &mut buffer).unwrap();
        assert_eq!(buffer.tokens().len(), 8);

        marshaller.reset(&second);
        buffer.clear();
        pump(&mut marshaller, &mut buffer).unwrap();
        assert_eq!(
            buffer.tokens(),
            [Token::MapOpen, s("z"), Token::Uint(9), Token::MapClose]
        );
    }

    #[test]
    fn absent_indirection_is_one_null() {
        let atlas = Atlas::empty();
        let absent: Option<Box<Option<u8>>> = None;
        assert_eq!(tokens(&atlas, &absent).unwrap(), [Token::Null]);

        let inner_absent: Option<Box<Option<u8>>> = Some(Box::new(None));
        assert_eq!(tokens(&atlas, &inner_absent).unwrap(), [Token::Null]);

        let present: Option<Box<Option<u8>>> = Some(Box::new(Some(3)));
        assert_eq!(tokens(&atlas, &present).unwrap(), [Token::Uint(3)]);

        // No atlas entry is needed when the value is never reached.
        let absent: Option<Nn> = None;
        assert_eq!(tokens(&atlas, &absent).unwrap(), [Token::Null]);
        let absent: Option<Box<Option<Nn>>> = Some(Box::new(None));
        assert_eq!(tokens(&atlas, &absent).unwrap(), [Token::Null]);

        let present = Some(Nn::default());
        assert!(matches!(tokens(&atlas, &present), Err(Error::NoHandler { .. })));
    }

    #[test]
    fn containers_and_dynamic_values() {
        let atlas = Atlas::builder()
            .struct_map::<Holder>(|m| m.all_members())
            .struct_map::<Nn>(|m| m.field("F", "f"))
            .build()
            .unwrap();

        let mut names = BTreeMap::new();
        names.insert(String::from("on"), true);
        names.insert(String::from("off"), false);
        let value = Holder {
            n: Some(Box::new(Some(Nn {
                f: -2,
                x: String::new(),
            }))),
            list: vec![1, 2],
            names,
            any: Value::Array(vec![Value::Null, Value::from("v")]),
        };

        assert_eq!(
            tokens(&atlas, &value).unwrap(),
            [
                Token::MapOpen,
                s("n"),
                Token::MapOpen,
                s("F"),
                Token::Int(-2),
                Token::MapClose,
                s("list"),
                Token::ArrOpen,
                Token::Uint(1),
                Token::Uint(2),
                Token::ArrClose,
                s("names"),
                Token::MapOpen,
                s("off"),
                Token::Bool(false),
                s("on"),
                Token::Bool(true),
                Token::MapClose,
                s("any"),
                Token::ArrOpen,
                Token::Null,
                s("v"),
                Token::ArrClose,
                Token::MapClose,
            ]
        );
    }

    #[test]
    fn leaves_and_empty_containers() {
        let atlas = Atlas::empty();
        assert_eq!(tokens(&atlas, &-5_i8).unwrap(), [Token::Int(-5)]);
        assert_eq!(tokens(&atlas, &1.5_f32).unwrap(), [Token::Float64(1.5)]);
        assert_eq!(
            tokens(&atlas, &vec![0xAB_u8]).unwrap(),
            [Token::Bytes(vec![0xAB])]
        );
        assert_eq!(
            tokens(&atlas, &Vec::<String>::new()).unwrap(),
            [Token::ArrOpen, Token::ArrClose]
        );
        assert_eq!(
            tokens(&atlas, &BTreeMap::<String, u8>::new()).unwrap(),
            [Token::MapOpen, Token::MapClose]
        );
        assert_eq!(tokens(&atlas, &Value::Null).unwrap(), [Token::Null]);
    }

    #[test]
    fn transform_marshals_the_surrogate() {
        let atlas = Atlas::builder()
            .transform::<Port, String>(|p| alloc::format!(":{}", p.0), |_| Port(0))
            .build()
            .unwrap();
        let ports = [Port(80), Port(443)];
        assert_eq!(
            tokens(&atlas, &ports).unwrap(),
            [Token::ArrOpen, s(":80"), s(":443"), Token::ArrClose]
        );
    }

    #[test]
    fn failing_transform_and_opaque() {
        let atlas = Atlas::builder()
            .try_transform::<Port, u8, &str>(
                |p| u8::try_from(p.0).map_err(|_| "port too large"),
                |v| Ok(Port(v.into())),
            )
            .build()
            .unwrap();
        assert_eq!(tokens(&atlas, &Port(8)).unwrap(), [Token::Uint(8)]);
        assert_eq!(
            tokens(&atlas, &Port(8080)).unwrap_err(),
            Error::Transform {
                type_name: Port::type_info().name(),
                message: "port too large".into(),
            }
        );

        let unsupported = tokens(&Atlas::empty(), &Port(1)).unwrap_err();
        assert!(matches!(unsupported, Error::Unsupported { .. }));
    }

    #[test]
    fn depth_limit() {
        let atlas = Atlas::builder()
            .struct_map::<Node>(|m| m.all_members())
            .build()
            .unwrap();
        let mut value = Node::default();
        for _ in 0..4 {
            value = Node {
                next: Some(Box::new(value)),
            };
        }

        let mut marshaller =
            Marshaller::with_options(&atlas, &value, Options::new().with_max_depth(3));
        let mut token = Token::Null;
        let result = loop {
            match marshaller.step(&mut token) {
                Ok(false) => continue,
                other => break other,
            }
        };
        assert_eq!(result, Err(Error::DepthExceeded(3)));

        assert!(tokens(&atlas, &value).is_ok());
    }

    #[test]
    fn pumps_into_a_buffer_and_resets() {
        let atlas = Atlas::builder()
            .struct_map::<Nn>(|m| m.field("X", "x"))
            .build()
            .unwrap();
        let first = Nn {
            f: 0,
            x: "a".into(),
        };
        let second = Nn {
            f: 0,
            x: "b".into(),
        };

        let mut marshaller = Marshaller::new(&atlas, &first);
        let mut sink = TokenBuffer::new();
        pump(&mut marshaller, &mut sink).unwrap();
        assert_eq!(sink.tokens()[2], s("a"));
        assert_eq!(marshaller.depth(), 0);

        marshaller.reset(&second);
        sink.clear();
        pump(&mut marshaller, &mut sink).unwrap();
        assert_eq!(sink.tokens(), [Token::MapOpen, s("X"), s("b"), Token::MapClose]);
    }
}
