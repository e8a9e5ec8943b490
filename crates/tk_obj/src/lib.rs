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

mod atlas;
mod error;
mod hash;
mod marshal;
mod options;
mod resolve;
mod slab;
mod unmarshal;
mod view;

// -----------------------------------------------------------------------------
// Top-level exports

pub use atlas::{Atlas, AtlasBuilder, AtlasEntry, AtlasError};
pub use atlas::{FieldEntry, StructMap, StructMapBuilder, Transform};
pub use error::Error;
pub use marshal::Marshaller;
pub use options::{Options, UnknownFieldPolicy};
pub use unmarshal::Unmarshaller;
