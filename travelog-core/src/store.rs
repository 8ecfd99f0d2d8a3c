//! Record store: the whole collection serialized as one JSON array under a
//! single key-value slot. Every save replaces the slot; there is no merge.

use std::sync::Arc;

use crate::error::{JournalError, Result};
use crate::models::Record;
use crate::storage::KeyValueStore;

#[derive(Clone)]
pub struct RecordStore {
    backend: Arc<dyn KeyValueStore>,
    slot: String,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn KeyValueStore>, slot: impl Into<String>) -> Self {
        Self {
            backend,
            slot: slot.into(),
        }
    }

    /// Read the collection in insertion order. An absent slot is an empty journal.
    pub async fn load(&self) -> Result<Vec<Record>> {
        let raw = self
            .backend
            .get(&self.slot)
            .await
            .map_err(|e| JournalError::StorageUnavailable(e.to_string()))?;

        let Some(raw) = raw else {
            tracing::debug!("Slot {} is empty", self.slot);
            return Ok(Vec::new());
        };

        let mut records: Vec<Record> = serde_json::from_str(&raw).map_err(|e| {
            JournalError::StorageUnavailable(format!("slot {} is not a record list: {}", self.slot, e))
        })?;
        for record in records.iter_mut().filter(|r| r.id.is_nil()) {
            record.id = record.legacy_id();
        }
        tracing::debug!(
            "Loaded {} records from {} slot {}",
            records.len(),
            self.backend.name(),
            self.slot
        );
        Ok(records)
    }

    /// Like [`load`](Self::load), but an unreadable slot is reported and shown as empty.
    /// Only for read-only views; mutations must use `load` so a corrupt slot is never
    /// overwritten.
    pub async fn load_or_empty(&self) -> Vec<Record> {
        match self.load().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Showing empty journal: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn save(&self, records: &[Record]) -> Result<()> {
        let raw = serde_json::to_string(records)
            .map_err(|e| JournalError::StorageWriteFailed(e.to_string()))?;
        self.backend
            .set(&self.slot, &raw)
            .await
            .map_err(|e| JournalError::StorageWriteFailed(e.to_string()))?;
        tracing::debug!("Saved {} records to slot {}", records.len(), self.slot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::MemoryKvStore;
    use async_trait::async_trait;

    const SLOT: &str = "travelRecords";

    struct BrokenBackend;

    #[async_trait]
    impl KeyValueStore for BrokenBackend {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(std::io::Error::other("disk gone").into())
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(std::io::Error::other("read-only").into())
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[tokio::test]
    async fn test_absent_slot_is_empty() {
        let store = RecordStore::new(Arc::new(MemoryKvStore::new()), SLOT);
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_slot_is_unavailable() {
        let store = RecordStore::new(Arc::new(MemoryKvStore::with_slot(SLOT, "{not json")), SLOT);
        assert!(matches!(
            store.load().await,
            Err(JournalError::StorageUnavailable(_))
        ));
        assert!(store.load_or_empty().await.is_empty());
    }

    #[tokio::test]
    async fn test_backend_failures_map_to_storage_errors() {
        let store = RecordStore::new(Arc::new(BrokenBackend), SLOT);
        assert!(matches!(
            store.load().await,
            Err(JournalError::StorageUnavailable(_))
        ));
        assert!(matches!(
            store.save(&[]).await,
            Err(JournalError::StorageWriteFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_legacy_ids_are_stable_across_loads() {
        let legacy = r#"[{"thoughts":"a","latitude":1.0,"longitude":2.0,"city":"","image":"file:///a.jpg","batteryLevel":9,"timestamp":"2024-01-01T00:00:00.000Z"}]"#;
        let store = RecordStore::new(Arc::new(MemoryKvStore::with_slot(SLOT, legacy)), SLOT);

        let first = store.load().await.unwrap();
        let second = store.load().await.unwrap();
        assert!(!first[0].id.is_nil());
        assert_eq!(first[0].id, second[0].id);
    }

    #[tokio::test]
    async fn test_slot_with_missing_battery_reading_loads() {
        let legacy = r#"[{"thoughts":"a","latitude":1.0,"longitude":2.0,"city":null,"image":"file:///a.jpg","batteryLevel":-100,"timestamp":"2024-01-01T00:00:00.000Z"},{"thoughts":"b","latitude":3.0,"longitude":4.0,"city":"Oslo","image":"file:///b.jpg","batteryLevel":57,"timestamp":"2024-01-02T00:00:00.000Z"}]"#;
        let store = RecordStore::new(Arc::new(MemoryKvStore::with_slot(SLOT, legacy)), SLOT);

        let records = store.load().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].battery_level, 0);
        assert_eq!(records[1].battery_level, 57);
    }

    #[tokio::test]
    async fn test_save_load_keeps_stored_text() {
        let stored = r#"[{"id":"7b5c24ab-1234-4678-9abc-def012345678","thoughts":"Nice view","latitude":48.858370123456789,"longitude":2.294481,"city":"Paris","image":"file:///a.jpg","batteryLevel":82,"timestamp":"2024-05-01T10:00:00.123Z"}]"#;
        let backend = Arc::new(MemoryKvStore::with_slot(SLOT, stored));
        let store = RecordStore::new(backend.clone(), SLOT);

        let records = store.load().await.unwrap();
        store.save(&records).await.unwrap();

        let after = backend.get(SLOT).await.unwrap().unwrap();
        let reloaded = store.load().await.unwrap();
        assert_eq!(reloaded, records);
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&after).unwrap(),
            serde_json::from_str::<serde_json::Value>(stored).unwrap()
        );
    }
}
