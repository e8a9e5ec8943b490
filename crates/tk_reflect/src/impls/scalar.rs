use alloc::string::String;

use crate::info::{ScalarKind, TypeInfo, TypeKind};
use crate::reflect::{Reflect, ReflectMut, ReflectRef, Scalar, ScalarMut, Typed};

macro_rules! impl_reflect_scalar {
    ($ty:ty, $kind:ident, |$v:ident| $read:expr) => {
        impl Typed for $ty {
            #[inline]
            fn type_info() -> TypeInfo {
                TypeInfo::of::<Self>(TypeKind::Scalar(ScalarKind::$kind))
            }
        }

        impl Reflect for $ty {
            #[inline]
            fn reflect_type_info(&self) -> TypeInfo {
                <Self as Typed>::type_info()
            }

            #[inline]
            fn reflect_ref(&self) -> ReflectRef<'_> {
                let $v = self;
                ReflectRef::Scalar($read)
            }

            #[inline]
            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Scalar(ScalarMut::$kind(self))
            }
        }
    };
}

impl_reflect_scalar!(bool, Bool, |v| Scalar::Bool(*v));
impl_reflect_scalar!(String, String, |v| Scalar::Str(v.as_str()));

impl_reflect_scalar!(i8, I8, |v| Scalar::Int(i64::from(*v)));
impl_reflect_scalar!(i16, I16, |v| Scalar::Int(i64::from(*v)));
impl_reflect_scalar!(i32, I32, |v| Scalar::Int(i64::from(*v)));
impl_reflect_scalar!(i64, I64, |v| Scalar::Int(*v));
impl_reflect_scalar!(isize, Isize, |v| Scalar::Int(*v as i64));

impl_reflect_scalar!(u8, U8, |v| Scalar::Uint(u64::from(*v)));
impl_reflect_scalar!(u16, U16, |v| Scalar::Uint(u64::from(*v)));
impl_reflect_scalar!(u32, U32, |v| Scalar::Uint(u64::from(*v)));
impl_reflect_scalar!(u64, U64, |v| Scalar::Uint(*v));
impl_reflect_scalar!(usize, Usize, |v| Scalar::Uint(*v as u64));

impl_reflect_scalar!(f32, F32, |v| Scalar::Float(f64::from(*v)));
impl_reflect_scalar!(f64, F64, |v| Scalar::Float(*v));

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use crate::{Reflect, ReflectMut, ReflectRef, Scalar, ScalarKind, ScalarMut};

    #[test]
    fn signedness_follows_declaration() {
        let small: u8 = 7;
        assert!(matches!(small.reflect_ref(), ReflectRef::Scalar(Scalar::Uint(7))));

        let neg: i16 = -3;
        assert!(matches!(neg.reflect_ref(), ReflectRef::Scalar(Scalar::Int(-3))));
    }

    #[test]
    fn scalar_mut_writes_through() {
        let mut s = String::from("old");
        match s.reflect_mut() {
            ReflectMut::Scalar(ScalarMut::String(s)) => s.push('!'),
            _ => panic!("expected a string scalar"),
        }
        assert_eq!(s, "old!");

        let mut f = 1.5_f32;
        let ReflectMut::Scalar(view) = f.reflect_mut() else {
            panic!("expected a scalar");
        };
        assert_eq!(view.kind(), ScalarKind::F32);
    }
}
