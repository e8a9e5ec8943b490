//! Kind-specific access traits.

use alloc::string::String;

use crate::Reflect;
use crate::reflect::Scalar;

// -----------------------------------------------------------------------------
// Struct

/// A struct with members addressed by declaration index.
///
/// Member names and types are described by the
/// [`TypeKind::Struct`](crate::TypeKind::Struct) field list; the indices
/// here follow the same order.
pub trait Struct: Reflect {
    fn field_at(&self, index: usize) -> Option<&dyn Reflect>;

    fn field_at_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
}

// -----------------------------------------------------------------------------
// Sequence

/// An ordered sequence of elements of one type.
pub trait Sequence: Reflect {
    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Option<&dyn Reflect>;

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// Removes every element; a no-op for fixed-size sequences.
    fn clear(&mut self);

    /// Appends a default element.
    ///
    /// Returns `false` if the sequence cannot grow.
    fn push_default(&mut self) -> bool;
}

// -----------------------------------------------------------------------------
// Map

/// A map keyed by strings.
pub trait Map: Reflect {
    fn len(&self) -> usize;

    /// Calls `f` once for every key, in the map's iteration order.
    fn for_each_key(&self, f: &mut dyn FnMut(&str));

    fn get(&self, key: &str) -> Option<&dyn Reflect>;

    fn get_mut(&mut self, key: &str) -> Option<&mut dyn Reflect>;

    fn clear(&mut self);

    /// Inserts a default value for `key`, replacing any existing entry.
    fn insert_default(&mut self, key: String);
}

// -----------------------------------------------------------------------------
// Indirect

/// One level of indirection, possibly absent.
pub trait Indirect: Reflect {
    /// Returns the pointee, or `None` when this level is absent.
    fn pointee(&self) -> Option<&dyn Reflect>;

    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect>;

    /// Whether this level may be absent at all.
    fn is_nullable(&self) -> bool;

    /// Clears this level; returns `false` if it is not nullable.
    fn set_absent(&mut self) -> bool;

    /// Returns the pointee, allocating a default one if absent.
    ///
    /// A present pointee is returned untouched.
    fn ensure_present(&mut self) -> &mut dyn Reflect;
}

// -----------------------------------------------------------------------------
// Dynamic

/// A value whose concrete type is decided at runtime.
pub trait Dynamic: Reflect {
    /// Returns the current concrete value, or `None` for null.
    fn inner(&self) -> Option<&dyn Reflect>;

    fn inner_mut(&mut self) -> Option<&mut dyn Reflect>;

    fn set_null(&mut self);

    /// Replaces the value with a boxed copy of `value`.
    fn set_scalar(&mut self, value: Scalar<'_>);

    /// Replaces the value with an empty map; [`inner_mut`](Dynamic::inner_mut)
    /// then yields that map.
    fn set_empty_map(&mut self);

    /// Replaces the value with an empty sequence.
    fn set_empty_array(&mut self);
}
