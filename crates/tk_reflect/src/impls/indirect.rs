use alloc::boxed::Box;

use crate::info::{TypeInfo, TypeKind};
use crate::ops::Indirect;
use crate::reflect::{Reflect, ReflectMut, ReflectRef, Typed};

// -----------------------------------------------------------------------------
// Option<T>

impl<T: Typed + Default> Typed for Option<T> {
    #[inline]
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(TypeKind::Indirect {
            pointee: T::type_info,
            nullable: true,
        })
    }
}

impl<T: Typed + Default> Reflect for Option<T> {
    #[inline]
    fn reflect_type_info(&self) -> TypeInfo {
        <Self as Typed>::type_info()
    }

    #[inline]
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Indirect(self)
    }

    #[inline]
    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Indirect(self)
    }
}

impl<T: Typed + Default> Indirect for Option<T> {
    #[inline]
    fn pointee(&self) -> Option<&dyn Reflect> {
        self.as_ref().map(|v| v as &dyn Reflect)
    }

    #[inline]
    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
        self.as_mut().map(|v| v as &mut dyn Reflect)
    }

    #[inline]
    fn is_nullable(&self) -> bool {
        true
    }

    #[inline]
    fn set_absent(&mut self) -> bool {
        *self = None;
        true
    }

    #[inline]
    fn ensure_present(&mut self) -> &mut dyn Reflect {
        self.get_or_insert_with(T::default)
    }
}

// -----------------------------------------------------------------------------
// Box<T>

impl<T: Typed> Typed for Box<T> {
    #[inline]
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(TypeKind::Indirect {
            pointee: T::type_info,
            nullable: false,
        })
    }
}

impl<T: Typed> Reflect for Box<T> {
    #[inline]
    fn reflect_type_info(&self) -> TypeInfo {
        <Self as Typed>::type_info()
    }

    #[inline]
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Indirect(self)
    }

    #[inline]
    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Indirect(self)
    }
}

impl<T: Typed> Indirect for Box<T> {
    #[inline]
    fn pointee(&self) -> Option<&dyn Reflect> {
        Some(&**self)
    }

    #[inline]
    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
        Some(&mut **self)
    }

    #[inline]
    fn is_nullable(&self) -> bool {
        false
    }

    #[inline]
    fn set_absent(&mut self) -> bool {
        false
    }

    #[inline]
    fn ensure_present(&mut self) -> &mut dyn Reflect {
        &mut **self
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use crate::{Reflect, ReflectMut};

    #[test]
    fn option_allocates_only_when_absent() {
        let mut value: Option<Box<u8>> = None;
        let ReflectMut::Indirect(outer) = value.reflect_mut() else {
            panic!("expected an indirection");
        };
        assert!(outer.pointee().is_none());
        assert!(outer.ensure_present().is::<Box<u8>>());
        assert_eq!(value, Some(Box::new(0)));

        let mut value = Some(7_u8);
        let ReflectMut::Indirect(outer) = value.reflect_mut() else {
            panic!("expected an indirection");
        };
        let _ = outer.ensure_present();
        assert_eq!(value, Some(7));
    }

    #[test]
    fn box_is_never_absent() {
        let mut value = Box::new(3_i64);
        let ReflectMut::Indirect(level) = value.reflect_mut() else {
            panic!("expected an indirection");
        };
        assert!(!level.is_nullable());
        assert!(!level.set_absent());
        assert_eq!(*value, 3);
    }
}
