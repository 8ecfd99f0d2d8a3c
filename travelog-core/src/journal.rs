//! Journal: the `load → reconcile → save` transaction boundary.
//!
//! Every mutation holds `write_lock` for its whole read-modify-write, so two
//! overlapping saves cannot clobber each other with a stale collection.
//! Reads go straight to the store; the backend replaces the slot atomically.
//!
//! Views subscribe to [`JournalEvent`]s instead of relying on screen focus to
//! know when to re-project.

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use crate::error::{JournalError, Result};
use crate::models::{Draft, Record};
use crate::projection::{ListView, MapView};
use crate::providers::{GeoLocator, Permission};
use crate::reconcile;
use crate::store::RecordStore;

const EVENT_CAPACITY: usize = 64;

/// A committed change. `index` is the storage index at commit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalEvent {
    Created { id: Uuid, index: usize },
    Updated { id: Uuid, index: usize },
    Deleted { id: Uuid, index: usize },
}

pub struct Journal {
    store: RecordStore,
    write_lock: Mutex<()>,
    events: broadcast::Sender<JournalEvent>,
}

/// The record at `index` must still be the one the caller saw.
fn verify(records: &[Record], index: usize, expected: Uuid) -> Result<()> {
    let found = records.get(index).ok_or(JournalError::IndexOutOfRange {
        index,
        len: records.len(),
    })?;
    if found.id != expected {
        return Err(JournalError::StaleReference { index, expected });
    }
    Ok(())
}

impl Journal {
    pub fn new(store: RecordStore) -> Self {
        let (events, _rx) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            write_lock: Mutex::new(()),
            events,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JournalEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: JournalEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    /// Stored collection in insertion order; fails on an unreadable slot.
    pub async fn records(&self) -> Result<Vec<Record>> {
        self.store.load().await
    }

    pub async fn list(&self) -> ListView {
        ListView::project(&self.store.load_or_empty().await)
    }

    /// Map of all records, centred on the user when location access is granted.
    pub async fn map(&self, locator: &dyn GeoLocator) -> MapView {
        let user_position = if locator.request_permission().await == Permission::Granted {
            match locator.current_position().await {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!("Map opened without user position: {}", e);
                    None
                }
            }
        } else {
            tracing::debug!("Location permission denied; map has no user pin");
            None
        };
        MapView::project(&self.store.load_or_empty().await, user_position)
    }

    pub async fn create(
        &self,
        draft: &Draft,
        now: DateTime<Utc>,
        battery_fraction: f64,
    ) -> Result<Record> {
        let _guard = self.write_lock.lock().await;

        let records = self.store.load().await?;
        let next = reconcile::commit_create(&records, draft, now, battery_fraction)?;
        self.store.save(&next).await?;

        let index = next.len() - 1;
        let record = next[index].clone();
        tracing::info!(
            "Created record {} at index {} ({}%)",
            record.id,
            index,
            record.battery_level
        );
        self.publish(JournalEvent::Created {
            id: record.id,
            index,
        });
        Ok(record)
    }

    /// Update the record at `origin_index`, provided it is still `expected_id`.
    pub async fn update(&self, origin_index: usize, expected_id: Uuid, draft: &Draft) -> Result<Record> {
        let _guard = self.write_lock.lock().await;

        let records = self.store.load().await?;
        verify(&records, origin_index, expected_id)?;
        let next = reconcile::commit_update(origin_index, draft, &records)?;
        self.store.save(&next).await?;

        let record = next[origin_index].clone();
        tracing::info!("Updated record {} at index {}", record.id, origin_index);
        self.publish(JournalEvent::Updated {
            id: record.id,
            index: origin_index,
        });
        Ok(record)
    }

    /// Delete by storage index. With `expected_id`, refuse if the slot has shifted.
    pub async fn delete(&self, index: usize, expected_id: Option<Uuid>) -> Result<Record> {
        let _guard = self.write_lock.lock().await;

        let records = self.store.load().await?;
        if let Some(expected) = expected_id {
            verify(&records, index, expected)?;
        }
        self.remove(records, index).await
    }

    /// Delete the row the user saw at `display_index` in the list view.
    ///
    /// The display index is translated against a fresh projection taken under
    /// the write lock, not the one the user was looking at.
    pub async fn delete_listed(&self, display_index: usize, expected_id: Uuid) -> Result<Record> {
        let _guard = self.write_lock.lock().await;

        let records = self.store.load().await?;
        let view = ListView::project(&records);
        let index = view.storage_index(display_index)?;
        verify(&records, index, expected_id)?;
        self.remove(records, index).await
    }

    async fn remove(&self, records: Vec<Record>, index: usize) -> Result<Record> {
        let next = reconcile::commit_delete(index, &records)?;
        self.store.save(&next).await?;

        let removed = records[index].clone();
        tracing::info!("Deleted record {} from index {}", removed.id, index);
        self.publish(JournalEvent::Deleted {
            id: removed.id,
            index,
        });
        Ok(removed)
    }
}
