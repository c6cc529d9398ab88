use std::panic::Location;
use std::result::Result as StdResult;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },

    #[error("Backup archive is missing manifest.json {location}")]
    MissingManifest { location: ErrorLocation },

    #[error("Invalid backup payload: {reason} {location}")]
    InvalidPayload {
        reason: String,
        location: ErrorLocation,
    },

    #[error("Malformed backup archive: {message} {location}")]
    MalformedArchive {
        message: String,
        location: ErrorLocation,
    },

    #[error("Unsupported backup version: {version} {location}")]
    UnsupportedVersion {
        version: u32,
        location: ErrorLocation,
    },

    #[error("Backup format not recognized {location}")]
    UnrecognizedFormat { location: ErrorLocation },

    #[error("Archive write failed: {message} {location}")]
    ArchiveWrite {
        message: String,
        location: ErrorLocation,
    },

    #[error("Operation aborted {location}")]
    Aborted { location: ErrorLocation },

    #[error("JSON error: {source} {location}")]
    Json {
        source: serde_json::Error,
        location: ErrorLocation,
    },
}

impl CoreError {
    #[track_caller]
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_payload<S: Into<String>>(reason: S) -> Self {
        Self::InvalidPayload {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn malformed_archive<S: Into<String>>(message: S) -> Self {
        Self::MalformedArchive {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn archive_write<S: Into<String>>(message: S) -> Self {
        Self::ArchiveWrite {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn aborted() -> Self {
        Self::Aborted {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Cancellation is a normal termination; callers use this to suppress
    /// success notifications rather than report a failure.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}

impl From<serde_json::Error> for CoreError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        Self::Json {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type CoreResult<T> = StdResult<T, CoreError>;
