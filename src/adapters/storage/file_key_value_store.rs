//! File-based Key-Value Store Adapter
//!
//! Stores each entry as `<key>.json` under a base directory, so a dashboard
//! survives process restarts.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::ports::{KeyValueStore, StorageError};

/// File-based storage for dashboard entries
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    base_path: PathBuf,
}

impl FileKeyValueStore {
    /// Create a new file store rooted at `base_path`
    ///
    /// The directory is created on first write.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Get the file path for an entry
    fn entry_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }

    async fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.entry_path(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::IoError(e.to_string())),
        }
    }

    async fn put(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.ensure_dir().await?;

        // Write to a sibling temp file, then rename into place
        let path = self.entry_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.entry_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::IoError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::keys;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_store_put_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        store.put(keys::SEGMENTS, "[]".to_string()).await.unwrap();

        assert_eq!(store.get(keys::SEGMENTS).await.unwrap(), Some("[]".to_string()));
        assert!(store.entry_path(keys::SEGMENTS).exists());
    }

    #[tokio::test]
    async fn test_file_store_missing_entry_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path().join("not-created-yet"));

        assert_eq!(store.get(keys::REVIEWS).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_overwrites_entry() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        store.put(keys::REVIEWS, "[1]".to_string()).await.unwrap();
        store.put(keys::REVIEWS, "[2]".to_string()).await.unwrap();

        assert_eq!(store.get(keys::REVIEWS).await.unwrap(), Some("[2]".to_string()));
    }

    #[tokio::test]
    async fn test_file_store_remove_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        store.put(keys::DOMAIN_CONTEXT, "{}".to_string()).await.unwrap();
        store.remove(keys::DOMAIN_CONTEXT).await.unwrap();
        store.remove(keys::DOMAIN_CONTEXT).await.unwrap();

        assert_eq!(store.get(keys::DOMAIN_CONTEXT).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_survives_new_instance() {
        let temp_dir = TempDir::new().unwrap();
        FileKeyValueStore::new(temp_dir.path())
            .put(keys::SEGMENTS, "[\"kept\"]".to_string())
            .await
            .unwrap();

        let reopened = FileKeyValueStore::new(temp_dir.path());
        assert_eq!(
            reopened.get(keys::SEGMENTS).await.unwrap(),
            Some("[\"kept\"]".to_string())
        );
    }
}
