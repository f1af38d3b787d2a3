//! File-backed key-value store - one JSON document on disk.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use settleup_core::StorageError;
use settleup_core::ports::KeyValueStore;

type Document = HashMap<String, String>;

/// Durable store keeping every key in a single JSON object.
///
/// Each mutation rewrites the whole document into a temporary file next to
/// the target and renames it into place, so readers see either the previous
/// document or the new one. Mutations are serialized in-process.
pub struct FileKeyValueStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Missing file reads as empty. So does a corrupt one; it is overwritten
    /// by the next mutation.
    async fn load(&self) -> Result<Document, StorageError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => {
                return Err(StorageError::Io(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        match serde_json::from_str(&contents) {
            Ok(document) => Ok(document),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Discarding corrupt storage file");
                Ok(Document::new())
            }
        }
    }

    async fn save(&self, document: &Document) -> Result<(), StorageError> {
        let contents = serde_json::to_string_pretty(document)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomically(&path, &contents))
            .await
            .map_err(|e| StorageError::Io(format!("Storage write task failed: {e}")))?
    }
}

fn write_atomically(path: &Path, contents: &str) -> Result<(), StorageError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    std::fs::create_dir_all(dir)
        .map_err(|e| StorageError::Io(format!("Failed to create {}: {e}", dir.display())))?;

    // NamedTempFile is created with 0600 on unix.
    let mut file = NamedTempFile::new_in(dir)
        .map_err(|e| StorageError::Io(format!("Failed to create temp file: {e}")))?;
    file.write_all(contents.as_bytes())
        .and_then(|()| file.as_file().sync_all())
        .map_err(|e| StorageError::Io(format!("Failed to write temp file: {e}")))?;

    file.persist(path)
        .map_err(|e| StorageError::Io(format!("Failed to replace {}: {}", path.display(), e.error)))?;
    Ok(())
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load().await?.remove(key))
    }

    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StorageError> {
        let mut document = self.load().await?;
        Ok(keys.iter().map(|key| document.remove(*key)).collect())
    }

    async fn multi_set(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut document = self.load().await?;
        for (key, value) in entries {
            document.insert((*key).to_string(), (*value).to_string());
        }
        self.save(&document).await
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut document = self.load().await?;
        let before = document.len();
        document.retain(|key, _| !keys.contains(&key.as_str()));

        if document.len() == before {
            return Ok(());
        }
        self.save(&document).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let store = FileKeyValueStore::new(&path);
        store
            .multi_set(&[("auth_token", "abc"), ("user_data", "{}")])
            .await
            .unwrap();

        let reopened = FileKeyValueStore::new(&path);
        assert_eq!(
            reopened.multi_get(&["auth_token", "user_data"]).await.unwrap(),
            vec![Some("abc".to_string()), Some("{}".to_string())]
        );
    }

    #[tokio::test]
    async fn test_remove_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("storage.json"));

        store
            .multi_set(&[("a", "1"), ("b", "2"), ("c", "3")])
            .await
            .unwrap();
        store.multi_remove(&["a", "b"]).await.unwrap();
        store.multi_remove(&["a", "b"]).await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), None);
        assert_eq!(store.get("c").await.unwrap(), Some("3".to_string()));
    }

    #[tokio::test]
    async fn test_missing_and_corrupt_files_read_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        let store = FileKeyValueStore::new(&path);

        assert_eq!(store.get("auth_token").await.unwrap(), None);
        store.multi_remove(&["auth_token"]).await.unwrap();
        assert!(!path.exists());

        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(store.get("auth_token").await.unwrap(), None);

        store.multi_set(&[("auth_token", "abc")]).await.unwrap();
        assert_eq!(store.get("auth_token").await.unwrap(), Some("abc".to_string()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        FileKeyValueStore::new(&path)
            .multi_set(&[("auth_token", "abc")])
            .await
            .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
