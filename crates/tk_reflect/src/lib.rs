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

mod impls;
mod info;
mod macros;
mod ops;
mod reflect;
mod value;

// -----------------------------------------------------------------------------
// Top-level exports

pub use info::{FieldInfo, ScalarKind, TypeInfo, TypeKind};
pub use ops::{Dynamic, Indirect, Map, Sequence, Struct};
pub use reflect::{ReflectMut, ReflectRef, Scalar, ScalarMut};
pub use reflect::{Reflect, Typed};
pub use value::Value;
