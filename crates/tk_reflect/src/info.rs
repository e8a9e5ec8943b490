use core::any::{Any, TypeId};
use core::fmt;

use crate::Typed;

// -----------------------------------------------------------------------------
// ScalarKind

/// The built-in leaf kinds.
///
/// These are resolved before any registry lookup and cannot be overridden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    String,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    /// A raw byte string, `Vec<u8>`.
    Bytes,
}

impl ScalarKind {
    /// Returns `true` for the signed integer kinds.
    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::Isize)
    }

    /// Returns `true` for the unsigned integer kinds.
    #[inline]
    pub const fn is_unsigned(self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64 | Self::Usize)
    }

    /// Returns `true` for `F32` and `F64`.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.pad("bool"),
            Self::String => f.pad("string"),
            Self::I8 => f.pad("i8"),
            Self::I16 => f.pad("i16"),
            Self::I32 => f.pad("i32"),
            Self::I64 => f.pad("i64"),
            Self::Isize => f.pad("isize"),
            Self::U8 => f.pad("u8"),
            Self::U16 => f.pad("u16"),
            Self::U32 => f.pad("u32"),
            Self::U64 => f.pad("u64"),
            Self::Usize => f.pad("usize"),
            Self::F32 => f.pad("f32"),
            Self::F64 => f.pad("f64"),
            Self::Bytes => f.pad("bytes"),
        }
    }
}

// -----------------------------------------------------------------------------
// FieldInfo

/// A declared struct member: its name and its type.
#[derive(Clone, Copy)]
pub struct FieldInfo {
    name: &'static str,
    // `TypeInfo` is built on demand; a function pointer keeps this `const`.
    type_info: fn() -> TypeInfo,
}

impl FieldInfo {
    /// Creates a member description for a field `name` of type `T`.
    #[inline]
    pub const fn new<T: Typed>(name: &'static str) -> Self {
        Self {
            name,
            type_info: T::type_info,
        }
    }

    /// Returns the member name as declared in source.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the member's [`TypeInfo`].
    #[inline]
    pub fn type_info(&self) -> TypeInfo {
        (self.type_info)()
    }
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("type", &self.type_info().name())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// TypeKind

/// The structural kind of a type.
///
/// Nested types are referenced through function pointers so that a
/// `TypeKind` stays `Copy` and recursive types do not recurse eagerly.
#[derive(Clone, Copy)]
pub enum TypeKind {
    /// A built-in leaf.
    Scalar(ScalarKind),
    /// A plain struct with named members, in declaration order.
    Struct { fields: &'static [FieldInfo] },
    /// A growable (`fixed_len == None`) or fixed-size sequence.
    Sequence {
        element: fn() -> TypeInfo,
        fixed_len: Option<usize>,
    },
    /// A string-keyed map.
    Map { value: fn() -> TypeInfo },
    /// One level of indirection; `nullable` levels may be absent.
    Indirect {
        pointee: fn() -> TypeInfo,
        nullable: bool,
    },
    /// A dynamically-typed value whose concrete type is only known at runtime.
    Dynamic,
    /// A type with no traversal strategy (for example function pointers).
    Opaque,
}

impl TypeKind {
    /// Returns a short description of the kind, without nested types.
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Struct { .. } => "struct",
            Self::Sequence { .. } => "sequence",
            Self::Map { .. } => "map",
            Self::Indirect { .. } => "indirection",
            Self::Dynamic => "dynamic",
            Self::Opaque => "opaque",
        }
    }
}

impl fmt::Debug for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => f.debug_tuple("Scalar").field(kind).finish(),
            Self::Struct { fields } => f.debug_struct("Struct").field("fields", fields).finish(),
            Self::Sequence { element, fixed_len } => f
                .debug_struct("Sequence")
                .field("element", &element().name())
                .field("fixed_len", fixed_len)
                .finish(),
            Self::Map { value } => f.debug_struct("Map").field("value", &value().name()).finish(),
            Self::Indirect { pointee, nullable } => f
                .debug_struct("Indirect")
                .field("pointee", &pointee().name())
                .field("nullable", nullable)
                .finish(),
            Self::Dynamic => f.pad("Dynamic"),
            Self::Opaque => f.pad("Opaque"),
        }
    }
}

// -----------------------------------------------------------------------------
// TypeInfo

/// Runtime description of a type: identity, name and structural kind.
///
/// Obtained through [`Typed::type_info`] when the type is known statically,
/// or [`Reflect::reflect_type_info`] from a value.
///
/// [`Reflect::reflect_type_info`]: crate::Reflect::reflect_type_info
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
    kind: TypeKind,
}

impl TypeInfo {
    /// Creates the description of `T` with the given kind.
    #[inline]
    pub fn of<T: Any + ?Sized>(kind: TypeKind) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
            kind,
        }
    }

    /// Returns the stable identity of the type.
    #[inline]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the full type name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the structural kind.
    #[inline]
    pub const fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Checks whether this describes `T`.
    #[inline]
    pub fn is<T: Any + ?Sized>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeInfo {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl fmt::Display for TypeInfo {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name)
    }
}

// -----------------------------------------------------------------------------
// Tests
