//! Device capabilities consumed by the journal.
//!
//! Provides traits for the three collaborators an entry needs:
//! - **GeoLocator**: permission, current position, reverse geocoding
//! - **ImageSource**: gallery and camera pickers
//! - **PowerSource**: battery level as a fraction
//!
//! The implementations here are the ones a desktop or CLI host can offer:
//! fixed coordinates, an image path on disk, and the Linux sysfs battery.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{JournalError, Result};
use crate::models::{Address, GeoPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Gallery,
    Camera,
}

/// Result of showing a picker to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Picked(String),
    Cancelled,
}

// ============================================================================
// Traits
// ============================================================================

#[async_trait]
pub trait GeoLocator: Send + Sync {
    async fn request_permission(&self) -> Permission;

    async fn current_position(&self) -> Result<GeoPoint>;

    /// Best effort; an empty list means nothing is known about the place.
    async fn reverse_geocode(&self, point: GeoPoint) -> Result<Vec<Address>>;
}

#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn request_permission(&self, kind: ImageKind) -> Permission;

    async fn pick_from_gallery(&self) -> Result<PickOutcome>;

    async fn capture_from_camera(&self) -> Result<PickOutcome>;
}

#[async_trait]
pub trait PowerSource: Send + Sync {
    /// Battery charge in `[0, 1]`.
    async fn battery_level(&self) -> Result<f64>;
}

// ============================================================================
// Location
// ============================================================================

/// A locator that always reports the same place. Denies permission when it
/// has no position to give.
#[derive(Debug, Clone, Default)]
pub struct FixedLocator {
    position: Option<GeoPoint>,
    address: Option<Address>,
}

impl FixedLocator {
    pub fn new(position: GeoPoint) -> Self {
        Self {
            position: Some(position),
            address: None,
        }
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn denied() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GeoLocator for FixedLocator {
    async fn request_permission(&self) -> Permission {
        if self.position.is_some() {
            Permission::Granted
        } else {
            Permission::Denied
        }
    }

    async fn current_position(&self) -> Result<GeoPoint> {
        self.position
            .ok_or_else(|| JournalError::Device("no position available".to_string()))
    }

    async fn reverse_geocode(&self, _point: GeoPoint) -> Result<Vec<Address>> {
        Ok(self.address.iter().cloned().collect())
    }
}

// ============================================================================
// Images
// ============================================================================

/// Serves one image file from disk for both the gallery and the camera.
/// `None` behaves like a user closing the picker.
#[derive(Debug, Clone, Default)]
pub struct PathImageSource {
    path: Option<PathBuf>,
}

impl PathImageSource {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    async fn pick(&self) -> Result<PickOutcome> {
        let Some(path) = &self.path else {
            return Ok(PickOutcome::Cancelled);
        };
        let absolute = tokio::fs::canonicalize(path)
            .await
            .map_err(|e| JournalError::Device(format!("cannot open image {}: {}", path.display(), e)))?;
        Ok(PickOutcome::Picked(file_uri(&absolute)))
    }
}

/// `file://` URI for an absolute local path.
pub fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

#[async_trait]
impl ImageSource for PathImageSource {
    async fn request_permission(&self, _kind: ImageKind) -> Permission {
        Permission::Granted
    }

    async fn pick_from_gallery(&self) -> Result<PickOutcome> {
        self.pick().await
    }

    async fn capture_from_camera(&self) -> Result<PickOutcome> {
        self.pick().await
    }
}

// ============================================================================
// Power
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct FixedPower(pub f64);

#[async_trait]
impl PowerSource for FixedPower {
    async fn battery_level(&self) -> Result<f64> {
        Ok(self.0)
    }
}

/// Reads `capacity` of the first battery under `/sys/class/power_supply`.
/// Machines without a battery report the configured fallback.
#[derive(Debug, Clone)]
pub struct SysfsPower {
    root: PathBuf,
    fallback: f64,
}

impl SysfsPower {
    pub fn new(fallback: f64) -> Self {
        Self::with_root("/sys/class/power_supply", fallback)
    }

    pub fn with_root(root: impl Into<PathBuf>, fallback: f64) -> Self {
        Self {
            root: root.into(),
            fallback,
        }
    }

    async fn read_capacity(&self) -> std::io::Result<Option<f64>> {
        let mut dir = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = dir.next_entry().await? {
            let supply = entry.path();
            let kind = tokio::fs::read_to_string(supply.join("type")).await.unwrap_or_default();
            if kind.trim() != "Battery" {
                continue;
            }
            let raw = tokio::fs::read_to_string(supply.join("capacity")).await?;
            if let Ok(percent) = raw.trim().parse::<f64>() {
                return Ok(Some(percent / 100.0));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl PowerSource for SysfsPower {
    async fn battery_level(&self) -> Result<f64> {
        match self.read_capacity().await {
            Ok(Some(level)) => Ok(level),
            Ok(None) => {
                tracing::debug!("No battery under {}, using fallback", self.root.display());
                Ok(self.fallback)
            }
            Err(e) => {
                tracing::warn!("Battery read failed under {}: {}", self.root.display(), e);
                Ok(self.fallback)
            }
        }
    }
}
