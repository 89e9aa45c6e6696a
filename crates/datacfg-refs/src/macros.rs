//! The [`persist!`](crate::persist) descriptor macro.

/// Implement [`Persist`](crate::Persist) for a struct.
///
/// List every persisted field in declaration order, each prefixed by its kind:
///
/// | kind         | field type                       |
/// |--------------|----------------------------------|
/// | `resource`   | `ResourceRef`                    |
/// | `resources`  | `Vec<ResourceRef>` or array      |
/// | `nested`     | `T: Persist`                     |
/// | `nested_opt` | `Option<T: Persist>`             |
/// | `nested_seq` | `Vec<T: Persist>`                |
/// | `plain`      | anything else                    |
///
/// Fields left out are transient.
///
/// ```
/// use datacfg_refs::{persist, Persist, ResourceRef};
///
/// #[derive(Default)]
/// struct LootDrop { chance: f32, icon: ResourceRef }
/// persist!(LootDrop { plain chance, resource icon });
///
/// #[derive(Default)]
/// struct Loot { drops: Vec<LootDrop>, cached_total: f32 }
/// persist!(Loot { nested_seq drops });
///
/// assert_eq!(Loot::default().field_names(), &["drops"]);
/// ```
#[macro_export]
macro_rules! persist {
    (@ref resource $e:expr) => { $crate::FieldRef::Resource(&$e) };
    (@ref resources $e:expr) => { $crate::FieldRef::Resources(&$e[..]) };
    (@ref nested $e:expr) => { $crate::FieldRef::Nested(Some(&$e as &dyn $crate::Persist)) };
    (@ref nested_opt $e:expr) => {
        $crate::FieldRef::Nested($e.as_ref().map(|v| v as &dyn $crate::Persist))
    };
    (@ref nested_seq $e:expr) => {
        $crate::FieldRef::NestedSeq($e.iter().map(|v| v as &dyn $crate::Persist).collect())
    };
    (@ref plain $e:expr) => { $crate::FieldRef::Plain };

    (@mut resource $e:expr) => { $crate::FieldMut::Resource(&mut $e) };
    (@mut resources $e:expr) => { $crate::FieldMut::Resources(&mut $e[..]) };
    (@mut nested $e:expr) => {
        $crate::FieldMut::Nested(Some(&mut $e as &mut dyn $crate::Persist))
    };
    (@mut nested_opt $e:expr) => {
        $crate::FieldMut::Nested($e.as_mut().map(|v| v as &mut dyn $crate::Persist))
    };
    (@mut nested_seq $e:expr) => {
        $crate::FieldMut::NestedSeq(
            $e.iter_mut().map(|v| v as &mut dyn $crate::Persist).collect(),
        )
    };
    (@mut plain $e:expr) => { $crate::FieldMut::Plain };

    ($ty:ident { $($kind:ident $field:ident),* $(,)? }) => {
        impl $crate::Persist for $ty {
            fn field_names(&self) -> &'static [&'static str] {
                &[$(stringify!($field)),*]
            }

            #[allow(unused_variables)]
            fn field(&self, name: &str) -> Option<$crate::FieldRef<'_>> {
                match name {
                    $(stringify!($field) => Some($crate::persist!(@ref $kind self.$field)),)*
                    _ => None,
                }
            }

            #[allow(unused_variables)]
            fn field_mut(&mut self, name: &str) -> Option<$crate::FieldMut<'_>> {
                match name {
                    $(stringify!($field) => Some($crate::persist!(@mut $kind self.$field)),)*
                    _ => None,
                }
            }
        }
    };
}
