//! Record reconciler: pure functions computing the next collection from the
//! current one and the outcome of one edit session.
//!
//! Nothing here touches storage. Callers load, reconcile and save in that
//! order, and only treat the result as committed once the save succeeded.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use uuid::Uuid;

use crate::error::{JournalError, Result};
use crate::models::{Draft, Record};

/// Convert a platform battery fraction to a whole percentage in 0..=100.
pub fn battery_percent(fraction: f64) -> u8 {
    if !fraction.is_finite() {
        return 0;
    }
    (fraction * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Drop sub-millisecond precision so the stamp survives the ISO-8601 round trip.
fn stamp(now: DateTime<Utc>) -> DateTime<Utc> {
    now.duration_trunc(TimeDelta::milliseconds(1)).unwrap_or(now)
}

fn check_index(index: usize, records: &[Record]) -> Result<()> {
    if index >= records.len() {
        return Err(JournalError::IndexOutOfRange {
            index,
            len: records.len(),
        });
    }
    Ok(())
}

/// Append a new record built from `draft`, stamped with `now` and the battery level.
pub fn commit_create(
    records: &[Record],
    draft: &Draft,
    now: DateTime<Utc>,
    battery_fraction: f64,
) -> Result<Vec<Record>> {
    let valid = draft.validate()?;
    let record = Record {
        id: Uuid::new_v4(),
        thoughts: valid.thoughts.to_string(),
        latitude: valid.location.latitude,
        longitude: valid.location.longitude,
        city: valid.city.to_string(),
        image: valid.image.to_string(),
        battery_level: battery_percent(battery_fraction),
        timestamp: stamp(now),
    };

    let mut next = Vec::with_capacity(records.len() + 1);
    next.extend_from_slice(records);
    next.push(record);
    Ok(next)
}

/// Overwrite the editable fields of the record at `origin_index`.
///
/// `id`, `timestamp` and `battery_level` are carried over from the stored
/// record. The index is trusted as given; callers holding an index across
/// another mutation must verify the id first (see `Journal::update`).
pub fn commit_update(origin_index: usize, draft: &Draft, records: &[Record]) -> Result<Vec<Record>> {
    check_index(origin_index, records)?;
    let valid = draft.validate()?;

    let mut next = records.to_vec();
    let slot = &mut next[origin_index];
    slot.thoughts = valid.thoughts.to_string();
    slot.latitude = valid.location.latitude;
    slot.longitude = valid.location.longitude;
    slot.city = valid.city.to_string();
    slot.image = valid.image.to_string();
    Ok(next)
}

/// Remove the record at `index`; later records shift down by one.
pub fn commit_delete(index: usize, records: &[Record]) -> Result<Vec<Record>> {
    check_index(index, records)?;
    let mut next = records.to_vec();
    next.remove(index);
    Ok(next)
}
