use alloc::vec::Vec;
use core::any::{Any, TypeId};

use crate::info::{ScalarKind, TypeInfo, TypeKind};
use crate::ops::Sequence;
use crate::reflect::{Reflect, ReflectMut, ReflectRef, Scalar, ScalarMut, Typed};

// -----------------------------------------------------------------------------
// Vec<T>

// `Vec<u8>` is the raw byte string; every other `Vec<T>` is a sequence.
#[inline]
fn is_bytes<T: Any>() -> bool {
    TypeId::of::<T>() == TypeId::of::<u8>()
}

impl<T: Typed + Default> Typed for Vec<T> {
    fn type_info() -> TypeInfo {
        if is_bytes::<T>() {
            TypeInfo::of::<Self>(TypeKind::Scalar(ScalarKind::Bytes))
        } else {
            TypeInfo::of::<Self>(TypeKind::Sequence {
                element: T::type_info,
                fixed_len: None,
            })
        }
    }
}

impl<T: Typed + Default> Reflect for Vec<T> {
    #[inline]
    fn reflect_type_info(&self) -> TypeInfo {
        <Self as Typed>::type_info()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        match (self as &dyn Any).downcast_ref::<Vec<u8>>() {
            Some(bytes) => ReflectRef::Scalar(Scalar::Bytes(bytes)),
            None => ReflectRef::Sequence(self),
        }
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        if is_bytes::<T>() {
            match (self as &mut dyn Any).downcast_mut::<Vec<u8>>() {
                Some(bytes) => ReflectMut::Scalar(ScalarMut::Bytes(bytes)),
                None => unreachable!("`Vec<T>` with `T == u8` is `Vec<u8>`"),
            }
        } else {
            ReflectMut::Sequence(self)
        }
    }
}

impl<T: Typed + Default> Sequence for Vec<T> {
    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|v| v as &dyn Reflect)
    }

    #[inline]
    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice().get_mut(index).map(|v| v as &mut dyn Reflect)
    }

    #[inline]
    fn clear(&mut self) {
        Vec::clear(self);
    }

    #[inline]
    fn push_default(&mut self) -> bool {
        self.push(T::default());
        true
    }
}

// -----------------------------------------------------------------------------
// [T; N]

impl<T: Typed, const N: usize> Typed for [T; N] {
    #[inline]
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(TypeKind::Sequence {
            element: T::type_info,
            fixed_len: Some(N),
        })
    }
}

impl<T: Typed, const N: usize> Reflect for [T; N] {
    #[inline]
    fn reflect_type_info(&self) -> TypeInfo {
        <Self as Typed>::type_info()
    }

    #[inline]
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Sequence(self)
    }

    #[inline]
    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Sequence(self)
    }
}

impl<T: Typed, const N: usize> Sequence for [T; N] {
    #[inline]
    fn len(&self) -> usize {
        N
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|v| v as &dyn Reflect)
    }

    #[inline]
    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice().get_mut(index).map(|v| v as &mut dyn Reflect)
    }

    #[inline]
    fn clear(&mut self) {}

    #[inline]
    fn push_default(&mut self) -> bool {
        false
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::{Reflect, ReflectMut, ReflectRef, Scalar, ScalarMut};

    #[test]
    fn byte_vec_is_scalar() {
        let mut bytes: Vec<u8> = vec![1, 2, 3];
        assert!(matches!(
            bytes.reflect_ref(),
            ReflectRef::Scalar(Scalar::Bytes(&[1, 2, 3]))
        ));
        match bytes.reflect_mut() {
            ReflectMut::Scalar(ScalarMut::Bytes(b)) => b.push(4),
            _ => panic!("expected bytes"),
        }
        assert_eq!(bytes, [1, 2, 3, 4]);
    }

    #[test]
    fn vec_grows_and_array_does_not() {
        let mut list: Vec<i32> = vec![5];
        let ReflectMut::Sequence(seq) = list.reflect_mut() else {
            panic!("expected a sequence");
        };
        seq.clear();
        assert!(seq.push_default());
        assert_eq!(seq.len(), 1);
        assert_eq!(list, [0]);

        let mut arr = [1_u16, 2];
        let ReflectMut::Sequence(seq) = arr.reflect_mut() else {
            panic!("expected a sequence");
        };
        seq.clear();
        assert!(!seq.push_default());
        assert_eq!(seq.len(), 2);
        assert!(seq.get(1).unwrap().is::<u16>());
    }
}
