use serde::{Deserialize, Serialize};

/// A point in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both coordinates finite and inside -90..=90 / -180..=180.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Result of reverse geocoding a point. Either part may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub city: Option<String>,
    pub region: Option<String>,
}

impl Address {
    /// City name, falling back to the region.
    pub fn label(&self) -> Option<&str> {
        self.city
            .as_deref()
            .filter(|c| !c.is_empty())
            .or_else(|| self.region.as_deref().filter(|r| !r.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_bounds() {
        assert!(GeoPoint::new(90.0, -180.0).is_valid());
        assert!(GeoPoint::new(-33.86, 151.21).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 2.0).is_valid());
        assert!(!GeoPoint::new(1.0, f64::INFINITY).is_valid());
        assert!(!GeoPoint::new(90.5, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -180.01).is_valid());
    }
}
