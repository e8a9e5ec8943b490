#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod decoder;
mod encoder;
mod error;
mod sink;

// -----------------------------------------------------------------------------
// Top-level exports

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::Error;
pub use sink::ByteSink;

#[cfg(feature = "std")]
pub use sink::IoSink;

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec::Vec;

    use tk_obj::{Atlas, Marshaller, Unmarshaller};
    use tk_reflect::{Value, impl_reflect_struct};
    use tk_token::pump;

    use crate::{Decoder, Encoder};

    #[derive(Default, Debug, PartialEq)]
    struct Nn {
        f: i64,
        x: String,
    }

    #[derive(Default, Debug, PartialEq)]
    struct Aa {
        x: String,
        y: Bb,
    }

    #[derive(Default, Debug, PartialEq)]
    struct Bb {
        z: String,
    }

    #[derive(Default, Debug, PartialEq)]
    struct Doc {
        title: String,
        tags: Vec<String>,
        scores: BTreeMap<String, f64>,
        parent: Option<Nn>,
        extra: Value,
    }

    impl_reflect_struct!(Nn { f: i64, x: String });
    impl_reflect_struct!(Aa { x: String, y: Bb });
    impl_reflect_struct!(Bb { z: String });
    impl_reflect_struct!(Doc {
        title: String,
        tags: Vec<String>,
        scores: BTreeMap<String, f64>,
        parent: Option<Nn>,
        extra: Value,
    });

    fn atlas() -> Atlas {
        Atlas::builder()
            .struct_map::<Nn>(|m| m.field("F", "f").field("X", "x"))
            .struct_map::<Aa>(|m| m.field("a.y", "y").field("a.x", "x"))
            .struct_map::<Bb>(|m| m.field("zee", "z"))
            .struct_map::<Doc>(|m| m.all_members())
            .build()
            .unwrap()
    }

    fn to_json(atlas: &Atlas, value: &dyn tk_reflect::Reflect) -> String {
        let mut out = Vec::new();
        pump(Marshaller::new(atlas, value), Encoder::new(&mut out)).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn marshal_to_json() {
        let atlas = atlas();
        let nn = Nn {
            f: 7,
            x: "s".into(),
        };
        assert_eq!(to_json(&atlas, &nn), r#"{"F":7,"X":"s"}"#);

        let aa = Aa {
            x: "s".into(),
            y: Bb::default(),
        };
        assert_eq!(to_json(&atlas, &aa), r#"{"a.y":{"zee":""},"a.x":"s"}"#);
    }

    #[test]
    fn json_round_trip() {
        let atlas = atlas();
        let input = r#"{
            "title": "notes",
            "tags": ["a", "bé"],
            "scores": {"z": 1.5, "a": -2.25},
            "parent": {"F": 3, "X": "up"},
            "extra": {"k": [1, 2.5, null, true]}
        }"#;

        let mut doc = Doc::default();
        pump(
            Decoder::new(input.as_bytes()),
            Unmarshaller::new(&atlas, &mut doc),
        )
        .unwrap();

        assert_eq!(doc.title, "notes");
        assert_eq!(doc.tags, ["a", "b\u{e9}"]);
        assert_eq!(doc.scores["a"], -2.25);
        assert_eq!(
            doc.parent,
            Some(Nn {
                f: 3,
                x: "up".into()
            })
        );
        assert_eq!(
            doc.extra.get("k"),
            Some(&Value::Array(alloc::vec![
                Value::Int(1),
                Value::Float(2.5),
                Value::Null,
                Value::Bool(true),
            ]))
        );

        let json = to_json(&atlas, &doc);
        let expected: serde_json::Value = serde_json::from_str(input).unwrap();
        let actual: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn absent_fields_write_null() {
        let atlas = atlas();
        let json = to_json(&atlas, &Doc::default());
        assert_eq!(
            json,
            r#"{"title":"","tags":[],"scores":{},"parent":null,"extra":null}"#
        );
    }
}
