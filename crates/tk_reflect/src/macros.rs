/// Implements [`Typed`], [`Reflect`] and [`Struct`] for a plain struct.
///
/// Members are listed with their types, in declaration order; that order
/// defines the member indices used by [`Struct::field_at`].
///
/// ```
/// use tk_reflect::{impl_reflect_struct, Typed, TypeKind};
///
/// #[derive(Default)]
/// struct Pair {
///     left: String,
///     right: Option<u64>,
/// }
///
/// impl_reflect_struct!(Pair { left: String, right: Option<u64> });
///
/// let TypeKind::Struct { fields } = Pair::type_info().kind() else {
///     unreachable!()
/// };
/// assert_eq!(fields.len(), 2);
/// assert!(fields[1].type_info().is::<Option<u64>>());
/// ```
///
/// [`Typed`]: crate::Typed
/// [`Reflect`]: crate::Reflect
/// [`Struct`]: crate::Struct
/// [`Struct::field_at`]: crate::Struct::field_at
#[macro_export]
macro_rules! impl_reflect_struct {
    ($ty:ty { $($field:ident : $fty:ty),* $(,)? }) => {
        impl $crate::Typed for $ty {
            fn type_info() -> $crate::TypeInfo {
                const FIELDS: &[$crate::FieldInfo] = &[
                    $($crate::FieldInfo::new::<$fty>(::core::stringify!($field)),)*
                ];
                $crate::TypeInfo::of::<Self>($crate::TypeKind::Struct { fields: FIELDS })
            }
        }

        impl $crate::Reflect for $ty {
            #[inline]
            fn reflect_type_info(&self) -> $crate::TypeInfo {
                <Self as $crate::Typed>::type_info()
            }

            #[inline]
            fn reflect_ref(&self) -> $crate::ReflectRef<'_> {
                $crate::ReflectRef::Struct(self)
            }

            #[inline]
            fn reflect_mut(&mut self) -> $crate::ReflectMut<'_> {
                $crate::ReflectMut::Struct(self)
            }
        }

        impl $crate::Struct for $ty {
            fn field_at(&self, index: usize) -> ::core::option::Option<&dyn $crate::Reflect> {
                [$(&self.$field as &dyn $crate::Reflect,)*].into_iter().nth(index)
            }

            fn field_at_mut(
                &mut self,
                index: usize,
            ) -> ::core::option::Option<&mut dyn $crate::Reflect> {
                [$(&mut self.$field as &mut dyn $crate::Reflect,)*].into_iter().nth(index)
            }
        }
    };
}

/// Implements [`Typed`] and [`Reflect`] for a type that has no traversal
/// strategy.
///
/// Opaque values are reported as unsupported when a traversal reaches them,
/// which is the behavior wanted for handles, function pointers and similar
/// types that can live inside a reflected struct but never be serialized.
///
/// [`Typed`]: crate::Typed
/// [`Reflect`]: crate::Reflect
#[macro_export]
macro_rules! impl_reflect_opaque {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::Typed for $ty {
                #[inline]
                fn type_info() -> $crate::TypeInfo {
                    $crate::TypeInfo::of::<Self>($crate::TypeKind::Opaque)
                }
            }

            impl $crate::Reflect for $ty {
                #[inline]
                fn reflect_type_info(&self) -> $crate::TypeInfo {
                    <Self as $crate::Typed>::type_info()
                }

                #[inline]
                fn reflect_ref(&self) -> $crate::ReflectRef<'_> {
                    $crate::ReflectRef::Opaque
                }

                #[inline]
                fn reflect_mut(&mut self) -> $crate::ReflectMut<'_> {
                    $crate::ReflectMut::Opaque
                }
            }
        )*
    };
}
