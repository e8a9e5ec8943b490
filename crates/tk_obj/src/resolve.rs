//! Mapping from a type to the machine that traverses it.
//!
//! Both slabs resolve every row from scratch, in this order: peel
//! indirections, built-in scalars, exact atlas lookup, then structural
//! fallbacks by kind. Nothing is cached; an atlas is read-only and a lookup
//! is a single hash probe.

use tk_reflect::{TypeInfo, TypeKind};

use crate::atlas::{Atlas, AtlasEntry, StructMap, Transform};
use crate::error::Error;

/// The traversal strategy chosen for one type, after indirections.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Strategy<'a> {
    Scalar,
    Struct(&'a StructMap),
    Transform(&'a Transform),
    Sequence {
        element: fn() -> TypeInfo,
        fixed_len: Option<usize>,
    },
    Map {
        value: fn() -> TypeInfo,
    },
    Dynamic,
}

/// A resolved row: the number of indirections around the strategy.
///
/// A failed strategy keeps its levels, so an absent indirection still
/// finishes without reaching the error.
#[derive(Debug)]
pub(crate) struct Resolution<'a> {
    pub(crate) levels: usize,
    pub(crate) strategy: Result<Strategy<'a>, Error>,
}

pub(crate) fn resolve(atlas: &Atlas, type_info: TypeInfo) -> Resolution<'_> {
    let mut inner = type_info;
    let mut levels = 0_usize;
    while let TypeKind::Indirect { pointee, .. } = inner.kind() {
        inner = pointee();
        levels += 1;
    }

    let strategy = strategy_for(atlas, inner);
    if let Err(err) = &strategy {
        log::debug!("no strategy for {type_info}: {err}");
    }

    Resolution { levels, strategy }
}

fn strategy_for(atlas: &Atlas, type_info: TypeInfo) -> Result<Strategy<'_>, Error> {
    if let TypeKind::Scalar(_) = type_info.kind() {
        return Ok(Strategy::Scalar);
    }

    match atlas.get(type_info.id()) {
        Some(AtlasEntry::StructMap(map)) => return Ok(Strategy::Struct(map)),
        Some(AtlasEntry::Transform(transform)) => return Ok(Strategy::Transform(transform)),
        None => {}
    }

    match type_info.kind() {
        TypeKind::Sequence { element, fixed_len } => Ok(Strategy::Sequence { element, fixed_len }),
        TypeKind::Map { value } => Ok(Strategy::Map { value }),
        TypeKind::Dynamic => Ok(Strategy::Dynamic),
        TypeKind::Struct { .. } => Err(Error::NoHandler {
            type_name: type_info.name(),
        }),
        TypeKind::Opaque | TypeKind::Scalar(_) | TypeKind::Indirect { .. } => {
            Err(Error::Unsupported {
                type_name: type_info.name(),
            })
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
