//! In-memory key-value store - used in tests and as the last-resort fallback.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use settleup_core::StorageError;
use settleup_core::ports::KeyValueStore;

/// In-memory store using a HashMap behind an async RwLock.
///
/// Multi-key operations run under one write lock, so they are atomic.
/// Note: Data is lost on process restart.
pub struct InMemoryKeyValueStore {
    store: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.store.read().await.get(key).cloned())
    }

    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StorageError> {
        let store = self.store.read().await;
        Ok(keys.iter().map(|key| store.get(*key).cloned()).collect())
    }

    async fn multi_set(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut store = self.store.write().await;
        for (key, value) in entries {
            store.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut store = self.store.write().await;
        for key in keys {
            store.remove(*key);
        }
        Ok(())
    }
}
