use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_PRIMARY_FILENAME, DEFAULT_SPILL_THRESHOLD_BYTES,
    MIN_SPILL_THRESHOLD_BYTES,
};

use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Serialized values longer than this go to the blob store.
    pub spill_threshold_bytes: usize,
    /// Capacity of the primary store; unlimited when unset.
    pub primary_quota_bytes: Option<usize>,
    /// Primary key-value file, relative to the config directory.
    pub primary_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            spill_threshold_bytes: DEFAULT_SPILL_THRESHOLD_BYTES,
            primary_quota_bytes: None,
            primary_file: String::from(DEFAULT_PRIMARY_FILENAME),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.spill_threshold_bytes < MIN_SPILL_THRESHOLD_BYTES {
            return Err(ConfigError::storage(format!(
                "storage.spill_threshold_bytes must be >= {}, got {}",
                MIN_SPILL_THRESHOLD_BYTES, self.spill_threshold_bytes
            )));
        }

        if self.primary_quota_bytes == Some(0) {
            return Err(ConfigError::storage(
                "storage.primary_quota_bytes must be greater than 0 when set",
            ));
        }

        if self.primary_file.trim().is_empty()
            || Path::new(&self.primary_file).is_absolute()
            || self.primary_file.contains("..")
        {
            return Err(ConfigError::storage(
                "storage.primary_file must be a relative path without '..'",
            ));
        }

        Ok(())
    }
}
