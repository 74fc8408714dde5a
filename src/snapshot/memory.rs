//! In-memory snapshot store implementation using `DashMap`.
//!
//! Snapshots are held as encoded JSON bytes, exactly what a durable backend
//! would write. Data is lost on process restart.

use dashmap::DashMap;

use super::{EngineSnapshot, SnapshotStore};
use crate::Result;

/// In-memory snapshot store using a lock-free concurrent hashmap.
pub struct MemorySnapshotStore {
    store: DashMap<String, Vec<u8>>,
}

impl MemorySnapshotStore {
    /// Create a new in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: DashMap::new(),
        }
    }

    /// Get the number of stored snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl Default for MemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save(&self, key: &str, snapshot: &EngineSnapshot) -> Result<()> {
        let bytes = serde_json::to_vec(snapshot)?;
        self.store.insert(key.to_string(), bytes);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<EngineSnapshot>> {
        let Some(bytes) = self.store.get(key) else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(bytes.value())?))
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.store.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.store.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        Ok(keys)
    }
}
