//! Capability traits: field descriptors for config objects and the
//! external-resource lookup the resolver calls through.

use datacfg_types::{ResourceHandle, ResourceId, ResourceRef};

/// Read access to one persisted field.
pub enum FieldRef<'a> {
    /// A single external-resource slot.
    Resource(&'a ResourceRef),
    /// A sequence of external-resource slots.
    Resources(&'a [ResourceRef]),
    /// A nested persistable object; `None` when an optional nested field is empty.
    Nested(Option<&'a dyn Persist>),
    /// A sequence of nested persistable objects.
    NestedSeq(Vec<&'a dyn Persist>),
    /// Anything else (numbers, strings, sequences of primitives, ...).
    Plain,
}

/// Write access to one persisted field.
pub enum FieldMut<'a> {
    Resource(&'a mut ResourceRef),
    Resources(&'a mut [ResourceRef]),
    Nested(Option<&'a mut dyn Persist>),
    NestedSeq(Vec<&'a mut dyn Persist>),
    Plain,
}

/// Field descriptor of a persistable type.
///
/// The resolver never inspects concrete types; everything it knows about an
/// object comes from this trait. Fields not listed in [`field_names`] are
/// transient and never visited.
///
/// Implement it with the [`persist!`](crate::persist) macro.
///
/// [`field_names`]: Persist::field_names
pub trait Persist {
    /// Persisted field names in declaration order.
    fn field_names(&self) -> &'static [&'static str];

    /// Read access to a persisted field, or `None` if `name` is not one.
    fn field(&self, name: &str) -> Option<FieldRef<'_>>;

    /// Write access to a persisted field, or `None` if `name` is not one.
    fn field_mut(&mut self, name: &str) -> Option<FieldMut<'_>>;
}

/// Lookup of live external resources.
///
/// `type_name` is the type recorded with the reference. Implementations
/// may use it to disambiguate; an empty `type_name` matches any type.
pub trait ResourceLocator: Send + Sync {
    /// Primary lookup by identity.
    fn by_id(&self, id: &ResourceId, type_name: &str) -> Option<ResourceHandle>;

    /// Fallback lookup by location hint.
    fn by_location(&self, location: &str, type_name: &str) -> Option<ResourceHandle>;
}
