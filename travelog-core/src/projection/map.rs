use serde::Serialize;
use uuid::Uuid;

use crate::config::MapConfig;
use crate::models::{GeoPoint, Record};

/// Pin for one stored record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordPin {
    pub id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
    pub image: String,
}

/// Visible area of the map: a centre plus the span in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Region {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

/// Every record as a pin, plus the user's position when it is known.
///
/// No sorting, clustering or culling; all pins are always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MapView {
    pub user_pin: Option<GeoPoint>,
    pub record_pins: Vec<RecordPin>,
}

impl MapView {
    pub fn project(records: &[Record], user_position: Option<GeoPoint>) -> Self {
        let record_pins = records
            .iter()
            .map(|r| RecordPin {
                id: r.id,
                latitude: r.latitude,
                longitude: r.longitude,
                label: r.city.clone(),
                image: r.image.clone(),
            })
            .collect();
        Self {
            user_pin: user_position,
            record_pins,
        }
    }

    /// Region centred on the user, or `None` while the position is unknown.
    pub fn centre_on_user(&self, config: &MapConfig) -> Option<Region> {
        self.user_pin.map(|p| Region {
            latitude: p.latitude,
            longitude: p.longitude,
            latitude_delta: config.latitude_delta,
            longitude_delta: config.longitude_delta,
        })
    }

    /// The map opens centred on the user.
    pub fn initial_region(&self, config: &MapConfig) -> Option<Region> {
        self.centre_on_user(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(city: &str, lat: f64, lon: f64, secs: i64) -> Record {
        Record {
            id: Uuid::new_v4(),
            thoughts: "t".to_string(),
            latitude: lat,
            longitude: lon,
            city: city.to_string(),
            image: format!("file:///{city}.jpg"),
            battery_level: 70,
            timestamp: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
        }
    }

    #[test]
    fn test_one_pin_per_record_in_storage_order() {
        let records = vec![
            record("Paris", 48.85, 2.35, 50),
            record("Oslo", 59.91, 10.75, 0),
            record("", 1.0, 2.0, 99),
        ];
        let view = MapView::project(&records, None);
        assert_eq!(view.record_pins.len(), 3);
        assert_eq!(view.record_pins[0].label, "Paris");
        assert_eq!(view.record_pins[1].label, "Oslo");
        assert_eq!(view.record_pins[2].label, "");
        assert_eq!(view.record_pins[1].latitude, 59.91);
        assert_eq!(view.record_pins[1].image, "file:///Oslo.jpg");
    }

    #[test]
    fn test_no_user_pin_without_position() {
        let view = MapView::project(&[], None);
        assert!(view.user_pin.is_none());
        assert!(view.centre_on_user(&MapConfig::default()).is_none());
    }

    #[test]
    fn test_centre_on_user_uses_configured_span() {
        let view = MapView::project(&[], Some(GeoPoint::new(35.68, 139.69)));
        let region = view.initial_region(&MapConfig::default()).unwrap();
        assert_eq!(region.latitude, 35.68);
        assert_eq!(region.longitude, 139.69);
        assert_eq!(region.latitude_delta, 0.0922);
        assert_eq!(region.longitude_delta, 0.0421);
    }
}
