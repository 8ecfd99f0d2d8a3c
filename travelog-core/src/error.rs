use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Field a draft was missing when it was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Thoughts,
    Location,
    Image,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MissingField::Thoughts => "thoughts",
            MissingField::Location => "location",
            MissingField::Image => "image",
        };
        f.write_str(name)
    }
}

/// Device capability guarded by a permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Location,
    Gallery,
    Camera,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Location => "location",
            Capability::Gallery => "gallery",
            Capability::Camera => "camera",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Missing required field: {0}")]
    Validation(MissingField),

    #[error("Location {latitude}, {longitude} is not a valid position")]
    InvalidLocation { latitude: f64, longitude: f64 },

    #[error("Index {index} is out of range for {len} records")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Record at index {index} is no longer {expected}; reload and retry")]
    StaleReference { index: usize, expected: Uuid },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Storage write failed: {0}")]
    StorageWriteFailed(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(Capability),

    #[error("Operation cancelled")]
    OperationCancelled,

    #[error("Device error: {0}")]
    Device(String),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Errors raised by key-value storage backends.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid key {0:?}")]
    InvalidKey(String),
}

pub type Result<T, E = JournalError> = std::result::Result<T, E>;
