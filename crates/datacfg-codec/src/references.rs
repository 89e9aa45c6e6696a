//! The reference table: side-channel record of a config's links to
//! external resources.

use datacfg_types::ResourceHandle;
use serde::{Deserialize, Serialize};

/// One recorded link from a payload field to an external resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceEntry {
    /// Dotted field path, with `name[i]` steps for sequence elements.
    pub field_path: String,
    /// Primary lookup identity.
    #[serde(rename = "objectGuid")]
    pub external_id: String,
    /// Fallback lookup hint.
    #[serde(rename = "assetPath")]
    pub location: String,
    /// Resource type as the host names it.
    #[serde(rename = "objectType")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ReferenceEntry {
    /// Record `handle` as the value of the field at `field_path`.
    pub fn from_handle(field_path: impl Into<String>, handle: &ResourceHandle) -> Self {
        Self {
            field_path: field_path.into(),
            external_id: handle.id.to_string(),
            location: handle.location.clone(),
            type_name: handle.type_name.clone(),
            address: handle.address.clone(),
        }
    }
}

/// Ordered sequence of [`ReferenceEntry`] values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceTable {
    #[serde(default)]
    pub references: Vec<ReferenceEntry>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ReferenceEntry) {
        self.references.push(entry);
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReferenceEntry> {
        self.references.iter()
    }

    /// Look up the entry recorded for a field path.
    pub fn get(&self, field_path: &str) -> Option<&ReferenceEntry> {
        self.references.iter().find(|e| e.field_path == field_path)
    }
}

impl<'a> IntoIterator for &'a ReferenceTable {
    type Item = &'a ReferenceEntry;
    type IntoIter = std::slice::Iter<'a, ReferenceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.references.iter()
    }
}

impl FromIterator<ReferenceEntry> for ReferenceTable {
    fn from_iter<I: IntoIterator<Item = ReferenceEntry>>(iter: I) -> Self {
        Self {
            references: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_from_handle() {
        let handle = ResourceHandle::new("g-1", "art/icon.png", "Texture").with_address("icon");
        let entry = ReferenceEntry::from_handle("icon", &handle);
        assert_eq!(entry.field_path, "icon");
        assert_eq!(entry.external_id, "g-1");
        assert_eq!(entry.location, "art/icon.png");
        assert_eq!(entry.type_name, "Texture");
        assert_eq!(entry.address.as_deref(), Some("icon"));
    }

    #[test]
    fn entry_field_names() {
        let handle = ResourceHandle::new("g-1", "art/icon.png", "Texture");
        let value = serde_json::to_value(ReferenceEntry::from_handle("icon", &handle)).unwrap();
        let obj = value.as_object().unwrap();
        for field in ["fieldPath", "objectGuid", "assetPath", "objectType"] {
            assert!(obj.contains_key(field), "missing {field}");
        }
        assert!(!obj.contains_key("address"));
    }

    #[test]
    fn table_preserves_order_and_lookup() {
        let a = ResourceHandle::new("a", "a.png", "Texture");
        let b = ResourceHandle::new("b", "b.png", "Texture");
        let table: ReferenceTable = [
            ReferenceEntry::from_handle("icons[0]", &a),
            ReferenceEntry::from_handle("icons[1]", &b),
        ]
        .into_iter()
        .collect();
        assert_eq!(table.len(), 2);
        assert_eq!(table.references[0].field_path, "icons[0]");
        assert_eq!(table.get("icons[1]").unwrap().external_id, "b");
        assert!(table.get("icons[2]").is_none());
    }

    #[test]
    fn missing_references_array_defaults_empty() {
        let table: ReferenceTable = serde_json::from_str("{}").unwrap();
        assert!(table.is_empty());
    }
}
