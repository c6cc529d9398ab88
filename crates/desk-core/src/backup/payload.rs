use crate::{CoreError, CoreResult, LocalWebBackup, ProfileCollection, WidgetDataEntry};

use std::collections::BTreeMap;
use std::panic::Location;

use chrono::{SecondsFormat, Utc};
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const BACKUP_APP_NAME: &str = "Escritorio Digital";

/// Manifest schema version written by this build and the only one accepted
/// on import.
pub const BACKUP_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMeta {
    pub app: String,
    pub version: u32,
    /// RFC3339 timestamp
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<ProfileCollection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_profile_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget_data: Option<BTreeMap<String, WidgetDataEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_web: Option<LocalWebBackup>,
}

/// The manifest of a backup: `manifest.json` inside an archive, or the
/// whole document of a plain-JSON backup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupPayload {
    pub meta: BackupMeta,
    pub data: BackupData,
}

impl BackupPayload {
    /// Stamps app name, version and creation time around caller data.
    pub fn build(data: BackupData) -> Self {
        Self {
            meta: BackupMeta {
                app: BACKUP_APP_NAME.to_string(),
                version: BACKUP_VERSION,
                created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            },
            data,
        }
    }

    /// Structural gate applied before anything else looks at a candidate.
    pub fn validate(candidate: &Value) -> bool {
        let Some(meta) = candidate.get("meta").and_then(Value::as_object) else {
            return false;
        };
        if !candidate.get("data").is_some_and(Value::is_object) {
            return false;
        }

        meta.get("app").is_some_and(Value::is_string)
            && meta.get("version").is_some_and(Value::is_number)
            && meta.get("createdAt").is_some_and(Value::is_string)
    }

    /// Validates the shape, then deserializes.
    #[track_caller]
    pub fn from_value(candidate: Value) -> CoreResult<Self> {
        if !Self::validate(&candidate) {
            return Err(CoreError::invalid_payload(
                "expected object meta {app, version, createdAt} and object data",
            ));
        }

        serde_json::from_value(candidate).map_err(|e| CoreError::invalid_payload(e.to_string()))
    }

    #[track_caller]
    pub fn ensure_supported_version(&self) -> CoreResult<()> {
        if self.meta.version != BACKUP_VERSION {
            return Err(CoreError::UnsupportedVersion {
                version: self.meta.version,
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(())
    }
}
