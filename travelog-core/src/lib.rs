pub mod config;
pub mod error;
pub mod journal;
pub mod models;
pub mod projection;
pub mod providers;
pub mod reconcile;
pub mod session;
pub mod storage;
pub mod store;

pub use config::TravelogConfig;
pub use error::{Capability, JournalError, MissingField, StorageError};
pub use journal::{Journal, JournalEvent};
pub use models::{Address, Draft, GeoPoint, Record};
pub use projection::{ListEntry, ListView, MapView, RecordPin, Region};
pub use providers::{
    FixedLocator, FixedPower, GeoLocator, ImageKind, ImageSource, PathImageSource, Permission,
    PickOutcome, PowerSource, SysfsPower,
};
pub use session::{EditSession, SaveFailure, SaveOutcome, SessionMode};
pub use storage::{FileKvStore, KeyValueStore, MemoryKvStore};
pub use store::RecordStore;
