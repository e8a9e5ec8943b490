use alloc::collections::BTreeMap;
use alloc::string::String;

use crate::info::{TypeInfo, TypeKind};
use crate::ops::Map;
use crate::reflect::{Reflect, ReflectMut, ReflectRef, Typed};

macro_rules! impl_reflect_map {
    ($($map:ident)::+) => {
        impl<V: Typed + Default> Typed for $($map)::+<String, V> {
            #[inline]
            fn type_info() -> TypeInfo {
                TypeInfo::of::<Self>(TypeKind::Map { value: V::type_info })
            }
        }

        impl<V: Typed + Default> Reflect for $($map)::+<String, V> {
            #[inline]
            fn reflect_type_info(&self) -> TypeInfo {
                <Self as Typed>::type_info()
            }

            #[inline]
            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::Map(self)
            }

            #[inline]
            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Map(self)
            }
        }

        impl<V: Typed + Default> Map for $($map)::+<String, V> {
            #[inline]
            fn len(&self) -> usize {
                $($map)::+::len(self)
            }

            fn for_each_key(&self, f: &mut dyn FnMut(&str)) {
                for key in self.keys() {
                    f(key);
                }
            }

            #[inline]
            fn get(&self, key: &str) -> Option<&dyn Reflect> {
                $($map)::+::get(self, key).map(|v| v as &dyn Reflect)
            }

            #[inline]
            fn get_mut(&mut self, key: &str) -> Option<&mut dyn Reflect> {
                $($map)::+::get_mut(self, key).map(|v| v as &mut dyn Reflect)
            }

            #[inline]
            fn clear(&mut self) {
                $($map)::+::clear(self);
            }

            #[inline]
            fn insert_default(&mut self, key: String) {
                self.insert(key, V::default());
            }
        }
    };
}

impl_reflect_map!(BTreeMap);

#[cfg(feature = "std")]
impl_reflect_map!(std::collections::HashMap);

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec::Vec;

    use crate::{Reflect, ReflectMut, ReflectRef};

    #[test]
    fn btree_map_access() {
        let mut map: BTreeMap<String, u32> = BTreeMap::new();
        map.insert("b".into(), 2);
        map.insert("a".into(), 1);

        let ReflectRef::Map(view) = map.reflect_ref() else {
            panic!("expected a map");
        };
        let mut keys = Vec::new();
        view.for_each_key(&mut |k| keys.push(String::from(k)));
        assert_eq!(keys, ["a", "b"]);
        assert!(view.get("a").unwrap().is::<u32>());
        assert!(view.get("c").is_none());

        let ReflectMut::Map(view) = map.reflect_mut() else {
            panic!("expected a map");
        };
        view.insert_default("a".into());
        assert_eq!(map["a"], 0);
    }
}
