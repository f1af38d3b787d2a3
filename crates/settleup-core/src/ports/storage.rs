use async_trait::async_trait;

use crate::error::StorageError;

/// Durable key-value storage - abstraction over device storage backends
/// (a file on disk, Redis, or memory in tests).
///
/// The multi-key operations must be atomic: a concurrent reader sees either
/// all of a `multi_set`/`multi_remove` or none of it.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get a single value.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Get several values in one consistent read, in the order of `keys`.
    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StorageError>;

    /// Set several values as one unit.
    async fn multi_set(&self, entries: &[(&str, &str)]) -> Result<(), StorageError>;

    /// Remove several keys as one unit. Missing keys are not an error.
    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StorageError>;
}
