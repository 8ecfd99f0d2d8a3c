use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use shellexpand::tilde;

pub const DEFAULT_SLOT: &str = "travelRecords";

#[derive(Debug, Deserialize, Clone)]
pub struct TravelogConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub map: MapConfig,
    pub device: DeviceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub data_dir: String,
    pub slot: String,
}

impl StorageConfig {
    /// Data directory with a leading `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(tilde(&self.data_dir).into_owned())
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct MapConfig {
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            latitude_delta: 0.0922,
            longitude_delta: 0.0421,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    /// Battery fraction reported when the platform has no battery reading.
    pub battery_fallback: f64,
}

impl TravelogConfig {
    /// Load from an optional TOML file, then `TRAVELOG__SECTION__KEY` env vars.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let map = MapConfig::default();
        let s = Config::builder()
            .set_default("service.log_level", "info")?
            .set_default("storage.data_dir", "~/.local/share/travelog")?
            .set_default("storage.slot", DEFAULT_SLOT)?
            .set_default("map.latitude_delta", map.latitude_delta)?
            .set_default("map.longitude_delta", map.longitude_delta)?
            .set_default("device.battery_fallback", 1.0)?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("TRAVELOG").separator("__"))
            .build()?;
        s.try_deserialize()
    }
}
