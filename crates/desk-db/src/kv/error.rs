use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KvError {
    #[error("Quota exceeded writing '{key}': {needed} of {quota} bytes {location}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
        location: ErrorLocation,
    },

    #[error("Primary store I/O error: {source} {location}")]
    Io {
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Serialization error for '{key}': {source} {location}")]
    Json {
        key: String,
        source: serde_json::Error,
        location: ErrorLocation,
    },

    #[error("Blob store error: {source} {location}")]
    Blob {
        source: sqlx::Error,
        location: ErrorLocation,
    },
}

impl KvError {
    #[track_caller]
    pub fn json(key: &str, source: serde_json::Error) -> Self {
        Self::Json {
            key: key.to_string(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

impl From<std::io::Error> for KvError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<sqlx::Error> for KvError {
    #[track_caller]
    fn from(source: sqlx::Error) -> Self {
        Self::Blob {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type KvResult<T> = std::result::Result<T, KvError>;
