// Function pointers can sit inside reflected structs, but a traversal that
// reaches one always fails.
crate::impl_reflect_opaque!(fn());

#[cfg(test)]
mod tests {
    use crate::{Reflect, ReflectRef, TypeKind, Typed};

    fn noop() {}

    #[test]
    fn function_pointers_are_opaque() {
        assert!(matches!(<fn()>::type_info().kind(), TypeKind::Opaque));
        let f: fn() = noop;
        assert!(matches!(f.reflect_ref(), ReflectRef::Opaque));
    }
}
