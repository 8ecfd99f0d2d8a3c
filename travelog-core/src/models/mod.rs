pub mod draft;
pub mod geo;
pub mod record;

pub use draft::Draft;
pub use geo::{Address, GeoPoint};
pub use record::Record;
