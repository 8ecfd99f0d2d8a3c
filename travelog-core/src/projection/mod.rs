//! Read-only views derived from the stored collection.

pub mod list;
pub mod map;

pub use list::{ListEntry, ListView};
pub use map::{MapView, RecordPin, Region};
