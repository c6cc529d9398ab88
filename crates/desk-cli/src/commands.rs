use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Write a backup of profiles, widget data and local sites
    Export {
        /// Destination file
        output: PathBuf,

        /// Only include this profile (repeatable; default: all)
        #[arg(long = "profile")]
        profiles: Vec<String>,

        /// Owner recorded for shared sites
        #[arg(long)]
        fallback_profile: Option<String>,

        /// Widget key to snapshot (repeatable; default: the known widget keys)
        #[arg(long = "key")]
        widget_keys: Vec<String>,

        /// Leave local sites out of the backup
        #[arg(long)]
        no_local_web: bool,

        #[arg(long, value_enum, default_value_t = BackupFormat::Zip)]
        format: BackupFormat,
    },

    /// Restore a backup (zip, JSON or a legacy tracker export)
    Import {
        /// Backup file
        input: PathBuf,

        /// Rename a profile while importing, as OLD=NEW (repeatable)
        #[arg(long = "map", value_parser = parse_profile_mapping)]
        profile_map: Vec<(String, String)>,

        /// Owner for imported sites that have none
        #[arg(long)]
        fallback_profile: Option<String>,
    },

    /// Count local sites and their bytes
    Stats {
        /// Only count sites of this profile, plus shared ones (repeatable)
        #[arg(long = "profile")]
        profiles: Vec<String>,
    },

    /// List local sites
    Sites {
        /// Only list sites of this profile, plus shared ones (repeatable)
        #[arg(long = "profile")]
        profiles: Vec<String>,
    },

    /// Copy every site visible to one profile into another
    CloneProfile {
        source: String,
        target: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupFormat {
    /// Zip container with the files stored as entries
    Zip,
    /// Single JSON document with base64 file contents
    Json,
}

/// Parses `OLD=NEW`.
pub fn parse_profile_mapping(s: &str) -> Result<(String, String), String> {
    let (old, new) = s
        .split_once('=')
        .ok_or_else(|| format!("expected OLD=NEW, got '{s}'"))?;
    let (old, new) = (old.trim(), new.trim());
    if old.is_empty() || new.is_empty() {
        return Err(format!("profile names cannot be empty in '{s}'"));
    }
    Ok((old.to_string(), new.to_string()))
}
