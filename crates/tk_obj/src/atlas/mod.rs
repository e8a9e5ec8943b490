//! The dispatch table from types to their marshalling strategy.

mod struct_map;
mod transform;

pub use struct_map::{FieldEntry, StructMap, StructMapBuilder};
pub use transform::Transform;

use alloc::string::String;
use core::any::TypeId;

use thiserror::Error;
use tk_reflect::{TypeInfo, TypeKind, Typed};

use crate::hash::TypeIdMap;

// -----------------------------------------------------------------------------
// AtlasEntry

/// How one registered type is traversed.
#[derive(Debug)]
#[non_exhaustive]
pub enum AtlasEntry {
    /// A struct walked through its explicit field list.
    StructMap(StructMap),
    /// A type replaced by a surrogate on the stream.
    Transform(Transform),
}

impl AtlasEntry {
    /// The type this entry is registered for.
    #[inline]
    pub const fn type_info(&self) -> TypeInfo {
        match self {
            Self::StructMap(map) => map.type_info(),
            Self::Transform(transform) => transform.target(),
        }
    }
}

// -----------------------------------------------------------------------------
// AtlasError

/// Invalid atlas configuration, reported by [`AtlasBuilder::build`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AtlasError {
    #[error("{type_name} has no member named {member:?}")]
    UnknownMember {
        type_name: &'static str,
        member: String,
    },

    #[error("{type_name} maps more than one member to {name:?}")]
    DuplicateName {
        type_name: &'static str,
        name: String,
    },

    #[error("{type_name} is a built-in scalar and cannot be overridden")]
    BuiltinScalar { type_name: &'static str },

    #[error("{type_name} is registered more than once")]
    DuplicateType { type_name: &'static str },

    #[error("{type_name} is a {kind}, struct maps need a struct")]
    NotAStruct {
        type_name: &'static str,
        kind: &'static str,
    },
}

// -----------------------------------------------------------------------------
// Atlas

/// An immutable registry of traversal strategies keyed by exact type.
///
/// Built once with [`Atlas::builder`] and then shared by any number of
/// marshallers and unmarshallers, including across threads. Built-in
/// scalars, sequences, maps, indirections and [`Value`] need no entry.
///
/// Lookups never consider related types: an entry for `T` says nothing
/// about `Option<T>`, which is peeled by the engines before the lookup.
///
/// # Examples
///
/// ```
/// use tk_obj::Atlas;
/// use tk_reflect::impl_reflect_struct;
///
/// #[derive(Default)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl_reflect_struct!(Point { x: i32, y: i32 });
///
/// let atlas = Atlas::builder()
///     .struct_map::<Point>(|m| m.field("X", "x").field("Y", "y"))
///     .build()
///     .unwrap();
///
/// assert_eq!(atlas.len(), 1);
/// ```
///
/// [`Value`]: tk_reflect::Value
#[derive(Debug, Default)]
pub struct Atlas {
    entries: TypeIdMap<AtlasEntry>,
}

impl Atlas {
    /// Creates an atlas without entries.
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn builder() -> AtlasBuilder {
        AtlasBuilder::new()
    }

    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&AtlasEntry> {
        self.entries.get(&type_id)
    }

    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.entries.contains_key(&type_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// -----------------------------------------------------------------------------
// AtlasBuilder

/// Collects entries for an [`Atlas`].
///
/// Registration methods chain; the first configuration error is kept and
/// returned by [`build`](AtlasBuilder::build).
#[derive(Debug, Default)]
pub struct AtlasBuilder {
    entries: TypeIdMap<AtlasEntry>,
    error: Option<AtlasError>,
}

impl AtlasBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a struct map for `T`.
    ///
    /// `fields` receives an empty builder and adds the serialized fields.
    pub fn struct_map<T: Typed>(
        self,
        fields: impl FnOnce(StructMapBuilder) -> StructMapBuilder,
    ) -> Self {
        let built = fields(StructMapBuilder::new(T::type_info())).finish();
        match built {
            Ok(map) => self.entry(AtlasEntry::StructMap(map)),
            Err(err) => self.fail(err),
        }
    }

    /// Registers an infallible transform from `T` to the surrogate `S`.
    pub fn transform<T, S>(
        self,
        to: impl Fn(&T) -> S + Send + Sync + 'static,
        from: impl Fn(S) -> T + Send + Sync + 'static,
    ) -> Self
    where
        T: Typed,
        S: Typed + Default,
    {
        self.entry(AtlasEntry::Transform(Transform::new(to, from)))
    }

    /// Registers a fallible transform from `T` to the surrogate `S`.
    pub fn try_transform<T, S, E>(
        self,
        to: impl Fn(&T) -> Result<S, E> + Send + Sync + 'static,
        from: impl Fn(S) -> Result<T, E> + Send + Sync + 'static,
    ) -> Self
    where
        T: Typed,
        S: Typed + Default,
        E: core::fmt::Display,
    {
        self.entry(AtlasEntry::Transform(Transform::try_new(to, from)))
    }

    /// Registers a prepared entry.
    pub fn entry(mut self, entry: AtlasEntry) -> Self {
        let type_info = entry.type_info();
        if let TypeKind::Scalar(_) = type_info.kind() {
            return self.fail(AtlasError::BuiltinScalar {
                type_name: type_info.name(),
            });
        }
        if self.entries.contains_key(&type_info.id()) {
            return self.fail(AtlasError::DuplicateType {
                type_name: type_info.name(),
            });
        }
        self.entries.insert(type_info.id(), entry);
        self
    }

    fn fail(mut self, err: AtlasError) -> Self {
        if self.error.is_none() {
            self.error = Some(err);
        }
        self
    }

    pub fn build(self) -> Result<Atlas, AtlasError> {
        match self.error {
            Some(err) => Err(err),
            None => {
                log::debug!("atlas built with {} entries", self.entries.len());
                Ok(Atlas {
                    entries: self.entries,
                })
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
