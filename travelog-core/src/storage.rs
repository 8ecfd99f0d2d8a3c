//! Key-value storage backends.
//!
//! The journal keeps its whole record collection under one named slot, so the
//! only contract a backend has to honour is `get` / `set` on string values,
//! with `set` replacing the previous value atomically.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::config::StorageConfig;
use crate::error::StorageError;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a slot. `Ok(None)` when it has never been written.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace a slot's value. Readers see either the old or the new value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

// ============================================================================
// File backend
// ============================================================================

/// One `<key>.json` file per slot under a data directory.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    root: PathBuf,
}

impl FileKvStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        tokio::fs::create_dir_all(&self.root).await?;

        // write-then-rename so a reader never sees a half-written slot
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

// ============================================================================
// In-memory backend
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryKvStore {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a slot, e.g. with data exported from another device.
    pub fn with_slot(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut slots = HashMap::new();
        slots.insert(key.into(), value.into());
        Self {
            slots: RwLock::new(slots),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Build the file backend described by the storage config.
pub fn open_file_store(config: &StorageConfig) -> FileKvStore {
    FileKvStore::new(config.data_path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_absent_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::new(dir.path());
        assert_eq!(store.get("travelRecords").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_set_replaces_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::new(dir.path().join("nested"));

        store.set("travelRecords", "[1]").await.unwrap();
        store.set("travelRecords", "[2]").await.unwrap();

        assert_eq!(
            store.get("travelRecords").await.unwrap().as_deref(),
            Some("[2]")
        );
        // temp file is renamed away
        assert!(!dir.path().join("nested/travelRecords.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::new(dir.path());
        let err = store.set("../escape", "x").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn test_open_file_store_uses_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            data_dir: dir.path().join("journal").to_string_lossy().into_owned(),
            slot: "travelRecords".to_string(),
        };
        let store = open_file_store(&config);
        store.set(&config.slot, "[]").await.unwrap();
        assert!(dir.path().join("journal/travelRecords.json").exists());
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryKvStore::with_slot("a", "1");
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));
        store.set("b", "2").await.unwrap();
        assert_eq!(store.get("b").await.unwrap().as_deref(), Some("2"));
        assert_eq!(store.get("c").await.unwrap(), None);
    }
}
