use crate::{
    ArchiveConfig, CONFIG_DIR_ENV, CONFIG_FILENAME, ConfigError, ConfigErrorResult,
    DEFAULT_CONFIG_DIRNAME, DatabaseConfig, LoggingConfig, StorageConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub archive: ArchiveConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config.
    ///
    /// Loading order:
    /// 1. DESK_CONFIG_DIR env var, else ./.desk/
    /// 2. Auto-create the config directory if it doesn't exist
    /// 3. config.toml if it exists, else defaults
    /// 4. DESK_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.clone(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Priority: DESK_CONFIG_DIR env var > ./.desk/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_DIRNAME))
    }

    /// Validate all sections. Call after load().
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.storage.validate()?;
        self.archive.validate()?;
        self.database.validate()?;
        Ok(())
    }

    pub fn database_path(&self) -> ConfigErrorResult<PathBuf> {
        Ok(Self::config_dir()?.join(&self.database.path))
    }

    pub fn primary_store_path(&self) -> ConfigErrorResult<PathBuf> {
        Ok(Self::config_dir()?.join(&self.storage.primary_file))
    }

    /// Relative log files live under the config directory; `None` means stderr.
    pub fn log_file_path(&self) -> ConfigErrorResult<Option<PathBuf>> {
        let Some(file) = self.logging.file.as_deref() else {
            return Ok(None);
        };
        let path = Path::new(file);
        if path.is_absolute() {
            return Ok(Some(path.to_path_buf()));
        }
        Ok(Some(Self::config_dir()?.join(path)))
    }

    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  storage: spill>{}B, quota={}, primary={}",
            self.storage.spill_threshold_bytes,
            self.storage
                .primary_quota_bytes
                .map_or_else(|| String::from("unlimited"), |q| format!("{q}B")),
            self.storage.primary_file
        );
        info!(
            "  archive: level={}, batch={}",
            self.archive.compression_level, self.archive.import_batch_size
        );
        info!("  database: {}", self.database.path);
        info!(
            "  logging: {} (colored: {}, file: {})",
            *self.logging.level,
            self.logging.colored,
            self.logging.file.as_deref().unwrap_or("stderr")
        );
    }

    fn apply_env_overrides(&mut self) {
        // Storage
        Self::apply_env_parse(
            "DESK_STORAGE_SPILL_THRESHOLD_BYTES",
            &mut self.storage.spill_threshold_bytes,
        );
        Self::apply_env_option_parse(
            "DESK_STORAGE_PRIMARY_QUOTA_BYTES",
            &mut self.storage.primary_quota_bytes,
        );
        Self::apply_env_string("DESK_STORAGE_PRIMARY_FILE", &mut self.storage.primary_file);

        // Archive
        Self::apply_env_parse(
            "DESK_ARCHIVE_COMPRESSION_LEVEL",
            &mut self.archive.compression_level,
        );
        Self::apply_env_parse(
            "DESK_ARCHIVE_IMPORT_BATCH_SIZE",
            &mut self.archive.import_batch_size,
        );

        // Database
        Self::apply_env_string("DESK_DATABASE_PATH", &mut self.database.path);

        // Logging
        Self::apply_env_parse("DESK_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("DESK_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("DESK_LOG_FILE", &mut self.logging.file);
    }

    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Accepts "true"/"1"
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    fn apply_env_option_parse<T: std::str::FromStr>(var_name: &str, target: &mut Option<T>) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = Some(parsed);
        }
    }

    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }
}
