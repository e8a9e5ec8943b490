//! Built-in [`Reflect`](crate::Reflect) implementations.

mod indirect;
mod map;
mod opaque;
mod scalar;
mod sequence;
