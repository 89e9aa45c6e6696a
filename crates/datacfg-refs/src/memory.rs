//! In-memory resource locator for testing and embedding.
//!
//! [`InMemoryLocator`] keeps registered handles in a `HashMap` protected by
//! a `RwLock`, indexed both by id and by location.

use std::collections::HashMap;
use std::sync::RwLock;

use datacfg_types::{ResourceHandle, ResourceId};

use crate::traits::ResourceLocator;

#[derive(Debug, Default)]
struct Tables {
    by_id: HashMap<ResourceId, ResourceHandle>,
    by_location: HashMap<String, ResourceId>,
}

/// An in-memory implementation of [`ResourceLocator`].
#[derive(Debug, Default)]
pub struct InMemoryLocator {
    tables: RwLock<Tables>,
}

impl InMemoryLocator {
    /// Create an empty locator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handle, replacing any previous handle with the same id.
    pub fn insert(&self, handle: ResourceHandle) {
        let mut tables = self.tables.write().expect("lock poisoned");
        if let Some(previous) = tables.by_id.get(&handle.id) {
            let stale = previous.location.clone();
            tables.by_location.remove(&stale);
        }
        if !handle.location.is_empty() {
            tables
                .by_location
                .insert(handle.location.clone(), handle.id.clone());
        }
        tables.by_id.insert(handle.id.clone(), handle);
    }

    /// Forget a handle. Returns `true` if it was registered.
    pub fn remove(&self, id: &ResourceId) -> bool {
        let mut tables = self.tables.write().expect("lock poisoned");
        match tables.by_id.remove(id) {
            Some(handle) => {
                tables.by_location.remove(&handle.location);
                true
            }
            None => false,
        }
    }

    /// Number of registered handles.
    pub fn len(&self) -> usize {
        self.tables.read().expect("lock poisoned").by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn type_matches(handle: &ResourceHandle, type_name: &str) -> bool {
    type_name.is_empty() || handle.type_name == type_name
}

impl ResourceLocator for InMemoryLocator {
    fn by_id(&self, id: &ResourceId, type_name: &str) -> Option<ResourceHandle> {
        let tables = self.tables.read().expect("lock poisoned");
        tables
            .by_id
            .get(id)
            .filter(|h| type_matches(h, type_name))
            .cloned()
    }

    fn by_location(&self, location: &str, type_name: &str) -> Option<ResourceHandle> {
        let tables = self.tables.read().expect("lock poisoned");
        let id = tables.by_location.get(location)?;
        tables
            .by_id
            .get(id)
            .filter(|h| type_matches(h, type_name))
            .cloned()
    }
}
