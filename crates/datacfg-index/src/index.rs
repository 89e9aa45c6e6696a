//! The [`KeyIndex`]: the persisted set of known config keys.
//!
//! The index keeps keys in insertion order and never holds duplicates. It is
//! pure data; loading and persisting take the medium as an argument.

use std::collections::HashSet;

use datacfg_store::ContentStore;
use datacfg_types::ConfigKey;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{IndexError, IndexResult};
use crate::layout::{key_from_location, CONFIG_PREFIX, INDEX_LOCATION};
use crate::status::IndexStatus;

/// Persisted form of the index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    #[serde(default)]
    pub configs: Vec<String>,
}

/// Ordered, duplicate-free set of config keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyIndex {
    keys: Vec<ConfigKey>,
}

impl KeyIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from keys, dropping repeats.
    pub fn from_keys(keys: impl IntoIterator<Item = ConfigKey>) -> Self {
        let mut index = Self::new();
        for key in keys {
            index.insert(key);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &ConfigKey) -> bool {
        self.keys.contains(key)
    }

    /// All keys in insertion order.
    pub fn keys(&self) -> &[ConfigKey] {
        &self.keys
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConfigKey> {
        self.keys.iter()
    }

    /// Add a key. Returns `false` if it was already present.
    pub fn insert(&mut self, key: ConfigKey) -> bool {
        if self.contains(&key) {
            return false;
        }
        self.keys.push(key);
        true
    }

    /// Remove a key. Returns `false` if it was not present.
    pub fn remove(&mut self, key: &ConfigKey) -> bool {
        match self.keys.iter().position(|k| k == key) {
            Some(pos) => {
                self.keys.remove(pos);
                true
            }
            None => false,
        }
    }

    // ---------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------

    pub fn to_document(&self) -> IndexDocument {
        IndexDocument {
            configs: self.keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Build an index from its document. Entries that are not valid keys
    /// are dropped with a warning.
    pub fn from_document(document: IndexDocument) -> Self {
        let mut index = Self::new();
        for raw in document.configs {
            match ConfigKey::parse(&raw) {
                Ok(key) => {
                    index.insert(key);
                }
                Err(e) => warn!("skipping invalid index entry {raw:?}: {e}"),
            }
        }
        index
    }

    pub fn encode(&self, pretty: bool) -> IndexResult<Vec<u8>> {
        let document = self.to_document();
        let result = if pretty {
            serde_json::to_vec_pretty(&document)
        } else {
            serde_json::to_vec(&document)
        };
        result.map_err(|e| IndexError::Serialization(e.to_string()))
    }

    pub fn decode(data: &[u8]) -> IndexResult<Self> {
        let document: IndexDocument =
            serde_json::from_slice(data).map_err(|e| IndexError::Serialization(e.to_string()))?;
        Ok(Self::from_document(document))
    }

    /// Read the index from `store`.
    ///
    /// Returns `Ok(None)` when no index document exists.
    pub fn load(store: &dyn ContentStore) -> IndexResult<Option<Self>> {
        match store.read(INDEX_LOCATION)? {
            Some(data) => {
                let index = Self::decode(&data)?;
                debug!(keys = index.len(), "loaded index");
                Ok(Some(index))
            }
            None => Ok(None),
        }
    }

    /// Write the index to `store`, replacing any previous document.
    pub fn persist(&self, store: &dyn ContentStore, pretty: bool) -> IndexResult<()> {
        let data = self.encode(pretty)?;
        store.write(INDEX_LOCATION, &data)?;
        debug!(keys = self.len(), "persisted index");
        Ok(())
    }

    /// Build an index from a full scan of the envelopes on `store`.
    ///
    /// Keys come out in medium listing order. Files whose names are not
    /// valid keys are skipped with a warning.
    pub fn scan(store: &dyn ContentStore) -> IndexResult<Self> {
        let mut index = Self::new();
        for location in store.list(CONFIG_PREFIX)? {
            match key_from_location(&location) {
                Some(key) => {
                    index.insert(key);
                }
                None => warn!("skipping unrecognised envelope location {location:?}"),
            }
        }
        debug!(keys = index.len(), "scanned medium");
        Ok(index)
    }

    /// Compare this index against the envelopes actually on `store`.
    pub fn status(&self, store: &dyn ContentStore) -> IndexResult<IndexStatus> {
        let scanned = Self::scan(store)?;
        let on_medium: HashSet<&ConfigKey> = scanned.iter().collect();
        let indexed: HashSet<&ConfigKey> = self.iter().collect();

        Ok(IndexStatus {
            indexed: self.len(),
            stale: self
                .iter()
                .filter(|k| !on_medium.contains(k))
                .cloned()
                .collect(),
            untracked: scanned
                .iter()
                .filter(|k| !indexed.contains(k))
                .cloned()
                .collect(),
        })
    }
}

impl<'a> IntoIterator for &'a KeyIndex {
    type Item = &'a ConfigKey;
    type IntoIter = std::slice::Iter<'a, ConfigKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::config_location;
    use datacfg_store::InMemoryContentStore;

    fn key(s: &str) -> ConfigKey {
        ConfigKey::parse(s).unwrap()
    }

    fn store_with(keys: &[&str]) -> InMemoryContentStore {
        let store = InMemoryContentStore::new();
        for k in keys {
            store.write(&config_location(&key(k)), b"{}").unwrap();
        }
        store
    }

    #[test]
    fn new_index_is_empty() {
        let index = KeyIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn insert_is_idempotent() {
        let mut index = KeyIndex::new();
        assert!(index.insert(key("Weapon_Sword")));
        assert!(!index.insert(key("Weapon_Sword")));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn keeps_insertion_order() {
        let index = KeyIndex::from_keys([key("b"), key("a"), key("b"), key("c")]);
        let keys: Vec<&str> = index.iter().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn remove_entry() {
        let mut index = KeyIndex::from_keys([key("a"), key("b")]);
        assert!(index.remove(&key("a")));
        assert!(!index.remove(&key("a")));
        assert!(!index.contains(&key("a")));
        assert!(index.contains(&key("b")));
    }

    #[test]
    fn document_shape() {
        let index = KeyIndex::from_keys([key("Weapon_Sword")]);
        let json = String::from_utf8(index.encode(false).unwrap()).unwrap();
        assert_eq!(json, r#"{"configs":["Weapon_Sword"]}"#);
    }

    #[test]
    fn decode_drops_invalid_and_duplicate_entries() {
        let index = KeyIndex::decode(br#"{"configs":["a","../x","a","b"]}"#).unwrap();
        let keys: Vec<&str> = index.iter().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn decode_tolerates_missing_list() {
        assert!(KeyIndex::decode(b"{}").unwrap().is_empty());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            KeyIndex::decode(b"not json"),
            Err(IndexError::Serialization(_))
        ));
    }

    #[test]
    fn load_missing_returns_none() {
        let store = InMemoryContentStore::new();
        assert!(KeyIndex::load(&store).unwrap().is_none());
    }

    #[test]
    fn persist_then_load() {
        let store = InMemoryContentStore::new();
        let index = KeyIndex::from_keys([key("a"), key("b")]);
        index.persist(&store, true).unwrap();
        assert_eq!(KeyIndex::load(&store).unwrap(), Some(index));
    }

    #[test]
    fn scan_finds_envelopes_only() {
        let store = store_with(&["Weapon_Sword", "Weapon_Axe"]);
        store.write(INDEX_LOCATION, b"{}").unwrap();
        store.write("other/thing", b"{}").unwrap();

        let index = KeyIndex::scan(&store).unwrap();
        let keys: Vec<&str> = index.iter().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["Weapon_Axe", "Weapon_Sword"]);
    }

    #[test]
    fn scan_skips_nested_locations() {
        let store = store_with(&["a"]);
        store.write("configs/sub/b", b"{}").unwrap();
        assert_eq!(KeyIndex::scan(&store).unwrap().len(), 1);
    }

    #[test]
    fn status_reports_drift() {
        let store = store_with(&["a", "b"]);
        let index = KeyIndex::from_keys([key("a"), key("gone")]);

        let status = index.status(&store).unwrap();
        assert_eq!(status.indexed, 2);
        assert_eq!(status.stale, vec![key("gone")]);
        assert_eq!(status.untracked, vec![key("b")]);
        assert!(!status.is_clean());
    }

    #[test]
    fn status_of_scanned_index_is_clean() {
        let store = store_with(&["a", "b"]);
        let index = KeyIndex::scan(&store).unwrap();
        assert!(index.status(&store).unwrap().is_clean());
    }
}
