//! Kind-specific views of values whose kind was fixed at resolution.
//!
//! A machine is only ever stepped against the value its row was resolved
//! for, so a view of the wrong kind means a `Reflect` implementation that
//! disagrees with its own `TypeInfo`, or an engine bug. Both are fatal.

use tk_reflect::{Dynamic, Indirect, Map, Reflect, ReflectMut, ReflectRef, Sequence, Struct};

#[cold]
#[inline(never)]
#[track_caller]
pub(crate) fn kind_mismatch(type_name: &'static str, expected: &str, found: &str) -> ! {
    panic!("{type_name} was resolved as {expected} but reflects as {found}")
}

#[cold]
#[inline(never)]
#[track_caller]
pub(crate) fn desync() -> ! {
    panic!("traversal state no longer matches the value being walked")
}

macro_rules! view_fns {
    ($($kind:ident: $view_ref:ident, $view_mut:ident => $tr:ident, $label:literal;)*) => {$(
        #[track_caller]
        pub(crate) fn $view_ref(value: &dyn Reflect) -> &dyn $tr {
            match value.reflect_ref() {
                ReflectRef::$kind(view) => view,
                other => kind_mismatch(value.reflect_type_info().name(), $label, other.describe()),
            }
        }

        #[track_caller]
        pub(crate) fn $view_mut(value: &mut dyn Reflect) -> &mut dyn $tr {
            let name = value.reflect_type_info().name();
            match value.reflect_mut() {
                ReflectMut::$kind(view) => view,
                other => kind_mismatch(name, $label, other.describe()),
            }
        }
    )*};
}

view_fns! {
    Struct: as_struct, as_struct_mut => Struct, "a struct";
    Sequence: as_sequence, as_sequence_mut => Sequence, "a sequence";
    Map: as_map, as_map_mut => Map, "a map";
    Indirect: as_indirect, as_indirect_mut => Indirect, "an indirection";
    Dynamic: as_dynamic, as_dynamic_mut => Dynamic, "a dynamic value";
}

/// Follows `levels` indirections, returning `None` at the first absent one.
pub(crate) fn pointee(mut value: &dyn Reflect, levels: usize) -> Option<&dyn Reflect> {
    for _ in 0..levels {
        value = as_indirect(value).pointee()?;
    }
    Some(value)
}

/// Follows `levels` indirections that are known to be present.
pub(crate) fn pointee_mut(mut value: &mut dyn Reflect, levels: usize) -> &mut dyn Reflect {
    for _ in 0..levels {
        value = match as_indirect_mut(value).pointee_mut() {
            Some(inner) => inner,
            None => desync(),
        };
    }
    value
}

/// Follows `levels` indirections, allocating every absent one.
pub(crate) fn ensure_present(mut value: &mut dyn Reflect, levels: usize) -> &mut dyn Reflect {
    for _ in 0..levels {
        value = as_indirect_mut(value).ensure_present();
    }
    value
}

/// Clears the outermost nullable level among the first `levels`.
///
/// Non-nullable levels above it are allocated on the way down. Returns
/// `false` when none of the levels can be absent.
pub(crate) fn clear_outermost(mut value: &mut dyn Reflect, levels: usize) -> bool {
    for _ in 0..levels {
        let level = as_indirect_mut(value);
        if level.set_absent() {
            return true;
        }
        value = level.ensure_present();
    }
    false
}
