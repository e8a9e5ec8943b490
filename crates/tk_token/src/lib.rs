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

mod buffer;
mod stream;
mod token;

// -----------------------------------------------------------------------------
// Top-level exports

pub use buffer::{BufferError, TokenBuffer, TokenSliceSource};
pub use stream::{PumpError, TokenSink, TokenSource, pump};
pub use token::{Token, TokenKind};
