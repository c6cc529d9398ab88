mod archive_config;
mod config;
mod database_config;
mod error;
mod log_level;
mod logging_config;
mod storage_config;

#[cfg(test)]
mod tests;

pub use archive_config::ArchiveConfig;
pub use config::Config;
pub use database_config::DatabaseConfig;
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use storage_config::StorageConfig;

const CONFIG_DIR_ENV: &str = "DESK_CONFIG_DIR";
const DEFAULT_CONFIG_DIRNAME: &str = ".desk";
const CONFIG_FILENAME: &str = "config.toml";

// Storage
const DEFAULT_SPILL_THRESHOLD_BYTES: usize = 200_000;
const MIN_SPILL_THRESHOLD_BYTES: usize = 1_024;
const DEFAULT_PRIMARY_FILENAME: &str = "primary.json";

// Archive
const DEFAULT_COMPRESSION_LEVEL: i64 = 6;
const MIN_COMPRESSION_LEVEL: i64 = 0;
const MAX_COMPRESSION_LEVEL: i64 = 9;
const DEFAULT_IMPORT_BATCH_SIZE: usize = 50;
const MAX_IMPORT_BATCH_SIZE: usize = 10_000;

// Database
const DEFAULT_DATABASE_FILENAME: &str = "desk.db";

// Logging
const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_COLORED: bool = true;
