use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use crate::info::{ScalarKind, TypeInfo};
use crate::ops::{Dynamic, Indirect, Map, Sequence, Struct};

// -----------------------------------------------------------------------------
// Reflect

/// Dynamic access to a value's structure.
///
/// The engines never name concrete types: they ask a value for its
/// [`TypeInfo`] and then read or write it through the kind-specific view
/// returned by [`reflect_ref`](Reflect::reflect_ref) and
/// [`reflect_mut`](Reflect::reflect_mut). The view must always agree with
/// the [`TypeKind`](crate::TypeKind) reported by the type info.
///
/// Implementations for plain structs are generated with
/// [`impl_reflect_struct!`](crate::impl_reflect_struct).
///
/// Reflected values are `Send + Sync`, so a value being marshalled can be
/// shared with other threads.
pub trait Reflect: Any + Send + Sync {
    /// Returns the type info of the concrete type.
    fn reflect_type_info(&self) -> TypeInfo;

    /// Returns an immutable, kind-specific view.
    fn reflect_ref(&self) -> ReflectRef<'_>;

    /// Returns a mutable, kind-specific view.
    fn reflect_mut(&mut self) -> ReflectMut<'_>;
}

/// Static type information.
pub trait Typed: Reflect {
    /// Returns the type info of `Self`.
    fn type_info() -> TypeInfo;
}

impl dyn Reflect {
    /// Checks whether the concrete type is `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        (self as &dyn Any).is::<T>()
    }

    /// Downcasts to a concrete type.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }

    /// Downcasts to a concrete type.
    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        (self as &mut dyn Any).downcast_mut::<T>()
    }
}

impl fmt::Debug for dyn Reflect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dyn Reflect<{}>", self.reflect_type_info().name())
    }
}

// -----------------------------------------------------------------------------
// Scalar

/// A borrowed leaf value.
///
/// Integers are widened to 64 bits; the declared signedness of the source
/// member decides between [`Scalar::Int`] and [`Scalar::Uint`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(&'a str),
    Bytes(&'a [u8]),
}

/// A mutable reference to a leaf, one variant per [`ScalarKind`].
pub enum ScalarMut<'a> {
    Bool(&'a mut bool),
    String(&'a mut String),
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    Isize(&'a mut isize),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    Usize(&'a mut usize),
    F32(&'a mut f32),
    F64(&'a mut f64),
    Bytes(&'a mut Vec<u8>),
}

impl ScalarMut<'_> {
    /// Returns the kind of the referenced leaf.
    pub const fn kind(&self) -> ScalarKind {
        match self {
            Self::Bool(_) => ScalarKind::Bool,
            Self::String(_) => ScalarKind::String,
            Self::I8(_) => ScalarKind::I8,
            Self::I16(_) => ScalarKind::I16,
            Self::I32(_) => ScalarKind::I32,
            Self::I64(_) => ScalarKind::I64,
            Self::Isize(_) => ScalarKind::Isize,
            Self::U8(_) => ScalarKind::U8,
            Self::U16(_) => ScalarKind::U16,
            Self::U32(_) => ScalarKind::U32,
            Self::U64(_) => ScalarKind::U64,
            Self::Usize(_) => ScalarKind::Usize,
            Self::F32(_) => ScalarKind::F32,
            Self::F64(_) => ScalarKind::F64,
            Self::Bytes(_) => ScalarKind::Bytes,
        }
    }
}

// -----------------------------------------------------------------------------
// ReflectRef / ReflectMut

/// An immutable view of a value, by structural kind.
pub enum ReflectRef<'a> {
    Scalar(Scalar<'a>),
    Struct(&'a dyn Struct),
    Sequence(&'a dyn Sequence),
    Map(&'a dyn Map),
    Indirect(&'a dyn Indirect),
    Dynamic(&'a dyn Dynamic),
    Opaque,
}

/// A mutable view of a value, by structural kind.
pub enum ReflectMut<'a> {
    Scalar(ScalarMut<'a>),
    Struct(&'a mut dyn Struct),
    Sequence(&'a mut dyn Sequence),
    Map(&'a mut dyn Map),
    Indirect(&'a mut dyn Indirect),
    Dynamic(&'a mut dyn Dynamic),
    Opaque,
}

impl ReflectRef<'_> {
    /// Returns the name of the view's kind.
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Struct(_) => "struct",
            Self::Sequence(_) => "sequence",
            Self::Map(_) => "map",
            Self::Indirect(_) => "indirection",
            Self::Dynamic(_) => "dynamic",
            Self::Opaque => "opaque",
        }
    }
}

impl ReflectMut<'_> {
    /// Returns the name of the view's kind.
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Struct(_) => "struct",
            Self::Sequence(_) => "sequence",
            Self::Map(_) => "map",
            Self::Indirect(_) => "indirection",
            Self::Dynamic(_) => "dynamic",
            Self::Opaque => "opaque",
        }
    }
}
