use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_COMPRESSION_LEVEL, DEFAULT_IMPORT_BATCH_SIZE,
    MAX_COMPRESSION_LEVEL, MAX_IMPORT_BATCH_SIZE, MIN_COMPRESSION_LEVEL,
};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Deflate level used when writing backups (0-9)
    pub compression_level: i64,
    /// Files written per transaction when restoring local sites
    pub import_batch_size: usize,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            import_batch_size: DEFAULT_IMPORT_BATCH_SIZE,
        }
    }
}

impl ArchiveConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if !(MIN_COMPRESSION_LEVEL..=MAX_COMPRESSION_LEVEL).contains(&self.compression_level) {
            return Err(ConfigError::archive(format!(
                "archive.compression_level must be {}-{}, got {}",
                MIN_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL, self.compression_level
            )));
        }

        if self.import_batch_size == 0 || self.import_batch_size > MAX_IMPORT_BATCH_SIZE {
            return Err(ConfigError::archive(format!(
                "archive.import_batch_size must be 1-{}, got {}",
                MAX_IMPORT_BATCH_SIZE, self.import_batch_size
            )));
        }

        Ok(())
    }
}
