use crate::kv::keys::{ACTIVE_PROFILE_KEY, PROFILES_KEY, WIDGET_DATA_KEYS};
use crate::{KeyValueStore, Result as DbErrorResult, SiteArchiveRepository};

use desk_core::{
    ArchiveCodec, BackupData, BackupPayload, EncodeOptions, LocalWebArchive, ProfileCollection,
    ProfileFilter, embed_local_web,
};

use std::sync::Arc;

use log::info;

/// What goes into a backup.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// Profiles to include; `None` or empty means all.
    pub profile_names: Option<Vec<String>>,
    /// Owner recorded for shared sites in the exported records.
    pub fallback_profile: Option<String>,
    /// Widget keys to snapshot; `None` uses [`WIDGET_DATA_KEYS`].
    pub widget_keys: Option<Vec<String>>,
    pub include_local_web: bool,
}

impl Default for ExportRequest {
    fn default() -> Self {
        Self {
            profile_names: None,
            fallback_profile: None,
            widget_keys: None,
            include_local_web: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub bytes: Vec<u8>,
    pub profile_count: usize,
    pub widget_count: usize,
    pub site_count: usize,
    pub file_count: usize,
}

pub struct ExportService {
    kv: Arc<KeyValueStore>,
    sites: Arc<SiteArchiveRepository>,
    codec: ArchiveCodec,
}

impl ExportService {
    pub fn new(
        kv: Arc<KeyValueStore>,
        sites: Arc<SiteArchiveRepository>,
        codec: ArchiveCodec,
    ) -> Self {
        Self { kv, sites, codec }
    }

    /// Gathers profiles, widget data and (optionally) local web records.
    pub async fn collect(
        &self,
        request: &ExportRequest,
    ) -> DbErrorResult<(BackupData, Option<LocalWebArchive>)> {
        let selected = request.profile_names.as_deref().filter(|n| !n.is_empty());

        let profiles = self
            .kv
            .get::<ProfileCollection>(PROFILES_KEY)
            .await?
            .map(|profiles| match selected {
                Some(names) => profiles
                    .into_iter()
                    .filter(|(name, _)| names.contains(name))
                    .collect(),
                None => profiles,
            });
        let active_profile_name = self.kv.get::<String>(ACTIVE_PROFILE_KEY).await?;

        let widget_data = match &request.widget_keys {
            Some(keys) => self.kv.export_entries(keys.as_slice()).await?,
            None => self.kv.export_entries(WIDGET_DATA_KEYS).await?,
        };

        let local_web = if request.include_local_web {
            let records = self
                .sites
                .export_records(
                    ProfileFilter::from_option(selected),
                    request.fallback_profile.as_deref(),
                )
                .await?;
            Some(records)
        } else {
            None
        };

        let data = BackupData {
            profiles,
            active_profile_name,
            widget_data: Some(widget_data),
            local_web: None,
        };
        Ok((data, local_web))
    }

    /// Builds a zip archive backup.
    pub async fn export(
        &self,
        request: &ExportRequest,
        options: EncodeOptions<'_>,
    ) -> DbErrorResult<ExportOutcome> {
        let (data, local_web) = self.collect(request).await?;
        let payload = BackupPayload::build(data);

        let bytes = self
            .codec
            .encode(&payload, local_web.as_ref(), options)
            .await?;

        let outcome = outcome(&payload, local_web.as_ref(), bytes);
        info!(
            "Exported archive: {} profiles, {} widget entries, {} sites, {} files, {} bytes",
            outcome.profile_count,
            outcome.widget_count,
            outcome.site_count,
            outcome.file_count,
            outcome.bytes.len()
        );
        Ok(outcome)
    }

    /// Builds a single-document JSON backup with file bytes inlined as
    /// base64.
    pub async fn export_json(&self, request: &ExportRequest) -> DbErrorResult<ExportOutcome> {
        let (mut data, local_web) = self.collect(request).await?;
        data.local_web = local_web.as_ref().map(embed_local_web);
        let payload = BackupPayload::build(data);

        let bytes = serde_json::to_vec(&payload).map_err(desk_core::CoreError::from)?;

        let outcome = outcome(&payload, local_web.as_ref(), bytes);
        info!(
            "Exported JSON backup: {} sites, {} files, {} bytes",
            outcome.site_count,
            outcome.file_count,
            outcome.bytes.len()
        );
        Ok(outcome)
    }
}

fn outcome(
    payload: &BackupPayload,
    local_web: Option<&LocalWebArchive>,
    bytes: Vec<u8>,
) -> ExportOutcome {
    ExportOutcome {
        bytes,
        profile_count: payload.data.profiles.as_ref().map_or(0, |p| p.len()),
        widget_count: payload.data.widget_data.as_ref().map_or(0, |w| w.len()),
        site_count: local_web.map_or(0, |l| l.sites.len()),
        file_count: local_web.map_or(0, |l| l.files.len()),
    }
}
