use alloc::string::String;
use alloc::vec::Vec;

use tk_reflect::{FieldInfo, TypeInfo, TypeKind};

use super::AtlasError;
use crate::hash::NameMap;

// -----------------------------------------------------------------------------
// FieldEntry

/// One serialized field of a [`StructMap`].
#[derive(Debug, Clone)]
pub struct FieldEntry {
    name: String,
    member: usize,
    type_info: TypeInfo,
}

impl FieldEntry {
    /// The key written to and expected from the token stream.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declaration index of the member inside the struct.
    #[inline]
    pub const fn member(&self) -> usize {
        self.member
    }

    /// Declared type of the member.
    #[inline]
    pub const fn type_info(&self) -> TypeInfo {
        self.type_info
    }
}

// -----------------------------------------------------------------------------
// StructMap

/// The ordered list of serialized fields of one struct type.
///
/// Marshalling emits fields in exactly this order; unmarshalling looks
/// incoming keys up by serialized name.
#[derive(Debug)]
pub struct StructMap {
    type_info: TypeInfo,
    fields: Vec<FieldEntry>,
    by_name: NameMap<usize>,
}

impl StructMap {
    #[inline]
    pub const fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[inline]
    pub fn fields(&self) -> &[FieldEntry] {
        &self.fields
    }

    /// Looks up a field by serialized name.
    #[inline]
    pub fn field(&self, name: &str) -> Option<&FieldEntry> {
        self.by_name.get(name).map(|&index| &self.fields[index])
    }
}

// -----------------------------------------------------------------------------
// StructMapBuilder

/// Builder for a [`StructMap`], see [`AtlasBuilder::struct_map`].
///
/// The first invalid call is remembered and reported by
/// [`AtlasBuilder::build`]; later calls are ignored.
///
/// [`AtlasBuilder::struct_map`]: crate::AtlasBuilder::struct_map
/// [`AtlasBuilder::build`]: crate::AtlasBuilder::build
pub struct StructMapBuilder {
    type_info: TypeInfo,
    members: &'static [FieldInfo],
    fields: Vec<FieldEntry>,
    by_name: NameMap<usize>,
    error: Option<AtlasError>,
}

impl StructMapBuilder {
    pub(super) fn new(type_info: TypeInfo) -> Self {
        let (members, error) = match type_info.kind() {
            TypeKind::Struct { fields } => (fields, None),
            other => (
                &[][..],
                Some(AtlasError::NotAStruct {
                    type_name: type_info.name(),
                    kind: other.describe(),
                }),
            ),
        };

        Self {
            type_info,
            members,
            fields: Vec::with_capacity(members.len()),
            by_name: NameMap::default(),
            error,
        }
    }

    /// Serializes `member` under the key `name`.
    ///
    /// Fields are emitted in the order they are added.
    pub fn field(mut self, name: impl Into<String>, member: &str) -> Self {
        if self.error.is_some() {
            return self;
        }

        let Some(index) = self.members.iter().position(|m| m.name() == member) else {
            self.error = Some(AtlasError::UnknownMember {
                type_name: self.type_info.name(),
                member: String::from(member),
            });
            return self;
        };

        let name = name.into();
        if self.by_name.contains_key(name.as_str()) {
            self.error = Some(AtlasError::DuplicateName {
                type_name: self.type_info.name(),
                name,
            });
            return self;
        }

        self.by_name.insert(name.clone(), self.fields.len());
        self.fields.push(FieldEntry {
            name,
            member: index,
            type_info: self.members[index].type_info(),
        });
        self
    }

    /// Serializes every member under its declared name, in declaration order.
    pub fn all_members(mut self) -> Self {
        for member in self.members {
            self = self.field(member.name(), member.name());
        }
        self
    }

    pub(super) fn finish(self) -> Result<StructMap, AtlasError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(StructMap {
                type_info: self.type_info,
                fields: self.fields,
                by_name: self.by_name,
            }),
        }
    }
}
