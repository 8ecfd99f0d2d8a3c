use serde::Serialize;
use uuid::Uuid;

use crate::error::{JournalError, Result};
use crate::models::Record;
use crate::session::EditSession;

/// One row of the list view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListEntry {
    pub display_index: usize,
    /// Position in the stored collection. Edit and delete requests use this.
    pub storage_index: usize,
    pub record: Record,
}

/// Records ordered most recent first. Read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListView {
    entries: Vec<ListEntry>,
}

impl ListView {
    /// Sort by timestamp descending; equal timestamps keep storage order.
    pub fn project(records: &[Record]) -> Self {
        let mut order: Vec<usize> = (0..records.len()).collect();
        // sort_by is stable
        order.sort_by(|&a, &b| records[b].timestamp.cmp(&records[a].timestamp));

        let entries = order
            .into_iter()
            .enumerate()
            .map(|(display_index, storage_index)| ListEntry {
                display_index,
                storage_index,
                record: records[storage_index].clone(),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, display_index: usize) -> Result<&ListEntry> {
        self.entries
            .get(display_index)
            .ok_or(JournalError::IndexOutOfRange {
                index: display_index,
                len: self.entries.len(),
            })
    }

    pub fn storage_index(&self, display_index: usize) -> Result<usize> {
        Ok(self.get(display_index)?.storage_index)
    }

    /// Stable id of the record shown at `display_index`.
    pub fn record_id(&self, display_index: usize) -> Result<Uuid> {
        Ok(self.get(display_index)?.record.id)
    }

    /// Seed an edit session for the row at `display_index`.
    pub fn edit_session(&self, display_index: usize) -> Result<EditSession> {
        let entry = self.get(display_index)?;
        Ok(EditSession::edit(entry.storage_index, &entry.record))
    }
}
