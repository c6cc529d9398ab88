use crate::KvError;

use desk_core::CoreError;

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLx error: {source} {location}")]
    Sqlx {
        source: sqlx::Error,
        location: ErrorLocation,
    },

    #[error("Migration error: {message} {location}")]
    Migration {
        message: String,
        location: ErrorLocation,
    },

    #[error("Database initialization failed: {message} {location}")]
    Initialization {
        message: String,
        location: ErrorLocation,
    },

    #[error("Corrupt row in {table}: {message} {location}")]
    CorruptRow {
        table: &'static str,
        message: String,
        location: ErrorLocation,
    },

    #[error(transparent)]
    Kv(#[from] KvError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl DbError {
    #[track_caller]
    pub fn corrupt_row<S: Into<String>>(table: &'static str, message: S) -> Self {
        Self::CorruptRow {
            table,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn aborted() -> Self {
        Self::Core(CoreError::aborted())
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_aborted())
    }
}

impl From<sqlx::Error> for DbError {
    #[track_caller]
    fn from(source: sqlx::Error) -> Self {
        Self::Sqlx {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
