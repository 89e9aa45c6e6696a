use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Primary lookup identity of an external resource.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceId({})", self.0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Handle to an external resource (texture, sound, prefab, ...) that a
/// config links to but the store does not own.
///
/// Handles are never written into a config's payload. They travel in the
/// envelope's reference table and are re-resolved on load, by `id` first
/// and by `location` as a fallback.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceHandle {
    /// Primary identity.
    pub id: ResourceId,
    /// Human-readable location (path-like), used as a fallback lookup key.
    pub location: String,
    /// Type of the resource as the host names it.
    pub type_name: String,
    /// Optional address under which a runtime loader can find the resource.
    pub address: Option<String>,
    /// Built-in resources ship with the host and are not independently
    /// addressable; they are never written to a reference table.
    pub builtin: bool,
}

impl ResourceHandle {
    /// Create a handle to an addressable resource.
    pub fn new(
        id: impl Into<ResourceId>,
        location: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            location: location.into(),
            type_name: type_name.into(),
            address: None,
            builtin: false,
        }
    }

    /// Create a handle to a built-in resource.
    pub fn builtin(location: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            id: ResourceId::new(String::new()),
            location: location.into(),
            type_name: type_name.into(),
            address: None,
            builtin: true,
        }
    }

    /// Attach a runtime address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Returns `true` if the handle can be recorded and restored later.
    pub fn is_addressable(&self) -> bool {
        !self.builtin && !(self.id.is_empty() && self.location.is_empty())
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A config field that links to an external resource.
///
/// The slot always serializes as `null`, so a payload never carries the
/// handle itself; sequences of slots keep their length, which lets indexed
/// reference paths such as `icons[2]` land in place on load.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ResourceRef(Option<ResourceHandle>);

impl ResourceRef {
    pub const fn none() -> Self {
        Self(None)
    }

    pub fn new(handle: ResourceHandle) -> Self {
        Self(Some(handle))
    }

    pub fn get(&self) -> Option<&ResourceHandle> {
        self.0.as_ref()
    }

    pub fn set(&mut self, handle: Option<ResourceHandle>) {
        self.0 = handle;
    }

    pub fn take(&mut self) -> Option<ResourceHandle> {
        self.0.take()
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}

impl From<ResourceHandle> for ResourceRef {
    fn from(handle: ResourceHandle) -> Self {
        Self::new(handle)
    }
}

impl From<Option<ResourceHandle>> for ResourceRef {
    fn from(handle: Option<ResourceHandle>) -> Self {
        Self(handle)
    }
}

impl Serialize for ResourceRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_none()
    }
}

impl<'de> Deserialize<'de> for ResourceRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde::de::IgnoredAny::deserialize(deserializer)?;
        Ok(Self::none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_handle_is_addressable() {
        let handle = ResourceHandle::new("abc", "art/sword.png", "Texture");
        assert!(handle.is_addressable());
        assert_eq!(handle.id.as_str(), "abc");
        assert!(handle.address.is_none());
    }

    #[test]
    fn builtin_handle_is_not_addressable() {
        let handle = ResourceHandle::builtin("builtin/Default-Material", "Material");
        assert!(handle.builtin);
        assert!(!handle.is_addressable());
    }

    #[test]
    fn handle_without_identity_is_not_addressable() {
        let handle = ResourceHandle::new("", "", "Texture");
        assert!(!handle.is_addressable());
    }

    #[test]
    fn with_address() {
        let handle = ResourceHandle::new("abc", "art/sword.png", "Texture").with_address("sword");
        assert_eq!(handle.address.as_deref(), Some("sword"));
    }

    #[test]
    fn resource_ref_serializes_as_null() {
        let slot = ResourceRef::new(ResourceHandle::new("abc", "a.png", "Texture"));
        assert_eq!(serde_json::to_string(&slot).unwrap(), "null");
        let slots = vec![slot.clone(), ResourceRef::none(), slot];
        assert_eq!(serde_json::to_string(&slots).unwrap(), "[null,null,null]");
    }

    #[test]
    fn resource_ref_deserializes_empty() {
        let slot: ResourceRef = serde_json::from_str("{\"anything\": 1}").unwrap();
        assert!(!slot.is_set());
        let slots: Vec<ResourceRef> = serde_json::from_str("[null, 3, null]").unwrap();
        assert_eq!(slots.len(), 3);
    }

    #[test]
    fn resource_ref_set_and_take() {
        let mut slot = ResourceRef::none();
        slot.set(Some(ResourceHandle::new("abc", "a.png", "Texture")));
        assert!(slot.is_set());
        assert_eq!(slot.get().unwrap().id.as_str(), "abc");
        assert!(slot.take().is_some());
        assert!(!slot.is_set());
    }

    #[test]
    fn resource_id_serde_is_transparent() {
        let id = ResourceId::new("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }
}
