//! Restoring a backup into the stores.
//!
//! [`ImportService::import`] parses and validates the whole input before it
//! writes anything, so a malformed archive, an unknown version or an
//! unrecognized document leaves every store as it was.

use crate::kv::keys::{ACTIVE_PROFILE_KEY, PROFILES_KEY};
use crate::{
    DbError, KeyValueStore, RecordImportOptions, Result as DbErrorResult, SiteArchiveRepository,
};

use desk_core::{
    ArchiveCodec, BackupPayload, LegacyExtraction, LocalWebArchive, ParsedBackup, ProgressFn,
    TRACKER_STORAGE_KEY, YieldFn, migrate_tracker_state, parse_backup,
};

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, info};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Copy, Default)]
pub struct ImportOptions<'a> {
    pub profile_name_map: Option<&'a HashMap<String, String>>,
    pub fallback_profile_name: Option<&'a str>,
    /// Files per transaction; `None` keeps the repository default.
    pub batch_size: Option<usize>,
    pub on_progress: Option<ProgressFn<'a>>,
    pub yield_control: Option<YieldFn<'a>>,
    pub cancel: Option<&'a CancellationToken>,
}

impl<'a> ImportOptions<'a> {
    fn record_options(&self) -> RecordImportOptions<'a> {
        let defaults = RecordImportOptions::default();
        RecordImportOptions {
            profile_name_map: self.profile_name_map,
            fallback_profile_name: self.fallback_profile_name,
            batch_size: self.batch_size.unwrap_or(defaults.batch_size),
            on_progress: self.on_progress,
            yield_control: self.yield_control,
            cancel: self.cancel,
        }
    }
}

/// What an import restored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// `archive`, `json` or `legacy`
    pub format: &'static str,
    pub profile_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_profile_name: Option<String>,
    pub widget_count: usize,
    pub site_count: usize,
    pub file_count: usize,
    /// Set when a legacy document was restored into the tracker key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy_strategy: Option<&'static str>,
}

pub struct ImportService {
    kv: Arc<KeyValueStore>,
    sites: Arc<SiteArchiveRepository>,
    codec: ArchiveCodec,
}

impl ImportService {
    pub fn new(
        kv: Arc<KeyValueStore>,
        sites: Arc<SiteArchiveRepository>,
        codec: ArchiveCodec,
    ) -> Self {
        Self { kv, sites, codec }
    }

    pub async fn import(
        &self,
        bytes: &[u8],
        options: ImportOptions<'_>,
    ) -> DbErrorResult<ImportSummary> {
        let parsed = parse_backup(&self.codec, bytes)?;
        debug!("Backup detected as {}", parsed.kind());

        if options.cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(DbError::aborted());
        }

        let summary = match parsed {
            ParsedBackup::Archive { payload, local_web } => {
                self.restore(payload, local_web, options, "archive").await?
            }
            ParsedBackup::Json { payload, local_web } => {
                self.restore(payload, local_web, options, "json").await?
            }
            ParsedBackup::Legacy(extraction) => self.restore_legacy(extraction).await?,
        };

        info!(
            "Imported {} backup: {} profiles, {} widget entries, {} sites, {} files",
            summary.format,
            summary.profile_count,
            summary.widget_count,
            summary.site_count,
            summary.file_count
        );
        Ok(summary)
    }

    async fn restore(
        &self,
        payload: BackupPayload,
        local_web: Option<LocalWebArchive>,
        options: ImportOptions<'_>,
        format: &'static str,
    ) -> DbErrorResult<ImportSummary> {
        let data = payload.data;
        let mut summary = ImportSummary {
            format,
            ..ImportSummary::default()
        };

        self.sites.clear().await?;

        if let Some(profiles) = &data.profiles {
            self.kv.set(PROFILES_KEY, profiles).await?;
            summary.profile_count = profiles.len();
        }
        if let Some(name) = &data.active_profile_name {
            self.kv.set(ACTIVE_PROFILE_KEY, name).await?;
            summary.active_profile_name = Some(name.clone());
        }
        if let Some(widget_data) = &data.widget_data {
            self.kv.import_entries(widget_data).await?;
            summary.widget_count = widget_data.len();
        }
        if let Some(records) = &local_web {
            self.sites
                .import_records(records, options.record_options())
                .await?;
            summary.site_count = records.sites.len();
            summary.file_count = records.files.len();
        }

        Ok(summary)
    }

    async fn restore_legacy(&self, extraction: LegacyExtraction) -> DbErrorResult<ImportSummary> {
        let migrated = migrate_tracker_state(&extraction.state, Utc::now().timestamp_millis());
        if migrated.changed {
            debug!("Legacy tracker state normalized on import");
        }

        self.kv.set(TRACKER_STORAGE_KEY, &migrated.state).await?;

        Ok(ImportSummary {
            format: "legacy",
            legacy_strategy: Some(extraction.strategy),
            ..ImportSummary::default()
        })
    }
}
