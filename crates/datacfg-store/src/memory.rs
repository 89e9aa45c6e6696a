use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::StoreResult;
use crate::key::validate_medium_key;
use crate::traits::ContentStore;

/// In-memory, HashMap-based medium.
///
/// Intended for tests and embedding. Documents are held behind a `RwLock`
/// and cloned on read and write.
pub struct InMemoryContentStore {
    documents: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryContentStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }

    /// Number of documents currently stored.
    pub fn len(&self) -> usize {
        self.documents.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored documents.
    pub fn total_bytes(&self) -> u64 {
        self.documents
            .read()
            .expect("lock poisoned")
            .values()
            .map(|doc| doc.len() as u64)
            .sum()
    }

    /// Remove all documents from the store.
    pub fn clear(&self) {
        self.documents.write().expect("lock poisoned").clear();
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore for InMemoryContentStore {
    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        validate_medium_key(key)?;
        let map = self.documents.read().expect("lock poisoned");
        Ok(map.get(key).cloned())
    }

    fn write(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        validate_medium_key(key)?;
        let mut map = self.documents.write().expect("lock poisoned");
        map.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        validate_medium_key(key)?;
        let map = self.documents.read().expect("lock poisoned");
        Ok(map.contains_key(key))
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        validate_medium_key(key)?;
        let mut map = self.documents.write().expect("lock poisoned");
        Ok(map.remove(key).is_some())
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let map = self.documents.read().expect("lock poisoned");
        let mut keys: Vec<String> = map
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

impl std::fmt::Debug for InMemoryContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryContentStore")
            .field("document_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn write_and_read() {
        let store = InMemoryContentStore::new();
        store.write("configs/a", b"{}").unwrap();
        assert_eq!(store.read("configs/a").unwrap().as_deref(), Some(&b"{}"[..]));
        assert!(store.exists("configs/a").unwrap());
    }

    #[test]
    fn read_missing_returns_none() {
        let store = InMemoryContentStore::new();
        assert!(store.read("configs/nope").unwrap().is_none());
        assert!(!store.exists("configs/nope").unwrap());
    }

    #[test]
    fn write_replaces() {
        let store = InMemoryContentStore::new();
        store.write("index", b"one").unwrap();
        store.write("index", b"two").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.read("index").unwrap().unwrap(), b"two");
        assert_eq!(store.total_bytes(), 3);
    }

    #[test]
    fn delete_reports_existence() {
        let store = InMemoryContentStore::new();
        store.write("configs/a", b"x").unwrap();
        assert!(store.delete("configs/a").unwrap());
        assert!(!store.delete("configs/a").unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn list_filters_by_prefix_sorted() {
        let store = InMemoryContentStore::new();
        for key in ["configs/b", "index", "configs/a", "other/c"] {
            store.write(key, b"x").unwrap();
        }
        assert_eq!(store.list("configs/").unwrap(), vec!["configs/a", "configs/b"]);
        assert_eq!(store.list("").unwrap().len(), 4);
    }

    #[test]
    fn invalid_keys_rejected() {
        let store = InMemoryContentStore::new();
        assert!(matches!(
            store.write("../escape", b"x"),
            Err(StoreError::InvalidKey { .. })
        ));
        assert!(store.read("").is_err());
    }

    #[test]
    fn clear_empties_store() {
        let store = InMemoryContentStore::new();
        store.write("index", b"x").unwrap();
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn debug_shows_count() {
        let store = InMemoryContentStore::new();
        store.write("index", b"x").unwrap();
        assert!(format!("{store:?}").contains("document_count: 1"));
    }
}
