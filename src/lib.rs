#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use tk_json as json;
pub use tk_obj as obj;
pub use tk_reflect as reflect;
pub use tk_token as token;
