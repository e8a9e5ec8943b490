use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::info::{TypeInfo, TypeKind};
use crate::ops::Dynamic;
use crate::reflect::{Reflect, ReflectMut, ReflectRef, Scalar, Typed};

// -----------------------------------------------------------------------------
// Value

/// A dynamically-typed value.
///
/// This is the target for data whose shape is only known once it arrives:
/// leaves are boxed into the matching variant, and nested maps and arrays
/// become [`Value::Map`] and [`Value::Array`] of further `Value`s.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Looks up `key` if this is a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Map(map) => map.get(key),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for Value {
    #[inline]
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(String::from(value))
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<Value>> for Value {
    #[inline]
    fn from(value: Vec<Value>) -> Self {
        Self::Array(value)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    #[inline]
    fn from(value: BTreeMap<String, Value>) -> Self {
        Self::Map(value)
    }
}

// -----------------------------------------------------------------------------
// Reflect

impl Typed for Value {
    #[inline]
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(TypeKind::Dynamic)
    }
}

impl Reflect for Value {
    #[inline]
    fn reflect_type_info(&self) -> TypeInfo {
        <Self as Typed>::type_info()
    }

    #[inline]
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Dynamic(self)
    }

    #[inline]
    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Dynamic(self)
    }
}

impl Dynamic for Value {
    fn inner(&self) -> Option<&dyn Reflect> {
        let inner: &dyn Reflect = match self {
            Self::Null => return None,
            Self::Bool(v) => v,
            Self::Int(v) => v,
            Self::Uint(v) => v,
            Self::Float(v) => v,
            Self::String(v) => v,
            Self::Bytes(v) => v,
            Self::Array(v) => v,
            Self::Map(v) => v,
        };
        Some(inner)
    }

    fn inner_mut(&mut self) -> Option<&mut dyn Reflect> {
        let inner: &mut dyn Reflect = match self {
            Self::Null => return None,
            Self::Bool(v) => v,
            Self::Int(v) => v,
            Self::Uint(v) => v,
            Self::Float(v) => v,
            Self::String(v) => v,
            Self::Bytes(v) => v,
            Self::Array(v) => v,
            Self::Map(v) => v,
        };
        Some(inner)
    }

    #[inline]
    fn set_null(&mut self) {
        *self = Self::Null;
    }

    fn set_scalar(&mut self, value: Scalar<'_>) {
        *self = match value {
            Scalar::Bool(v) => Self::Bool(v),
            Scalar::Int(v) => Self::Int(v),
            Scalar::Uint(v) => Self::Uint(v),
            Scalar::Float(v) => Self::Float(v),
            Scalar::Str(v) => Self::String(String::from(v)),
            Scalar::Bytes(v) => Self::Bytes(Vec::from(v)),
        };
    }

    #[inline]
    fn set_empty_map(&mut self) {
        *self = Self::Map(BTreeMap::new());
    }

    #[inline]
    fn set_empty_array(&mut self) {
        *self = Self::Array(Vec::new());
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::Value;
    use crate::{Dynamic, Reflect, ReflectMut, Scalar, ScalarKind, TypeKind};

    #[test]
    fn inner_exposes_concrete_type() {
        let v = Value::Int(-2);
        let inner = v.inner().unwrap();
        assert!(matches!(
            inner.reflect_type_info().kind(),
            TypeKind::Scalar(ScalarKind::I64)
        ));

        let v = Value::Array(vec![Value::Null]);
        assert!(matches!(
            v.inner().unwrap().reflect_type_info().kind(),
            TypeKind::Sequence { .. }
        ));

        assert!(Value::Null.inner().is_none());
    }

    #[test]
    fn reflected_values_are_shareable() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn Reflect>();
        assert_send_sync::<Value>();
    }

    #[test]
    fn boxing_leaves() {
        let mut v = Value::Null;
        let ReflectMut::Dynamic(d) = v.reflect_mut() else {
            panic!("expected dynamic");
        };
        d.set_scalar(Scalar::Str("hi"));
        assert_eq!(v, Value::from("hi"));

        v.set_empty_map();
        assert_eq!(v.get("missing"), None);
        assert!(matches!(v, Value::Map(_)));
    }
}
