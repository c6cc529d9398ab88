pub mod archive;
pub mod legacy;
pub mod payload;

use crate::backup::archive::{ArchiveCodec, is_zip_archive};
use crate::backup::legacy::{LegacyExtraction, extract_legacy_state};
use crate::backup::payload::BackupPayload;
use crate::{
    CoreError, CoreResult, LocalWebArchive, LocalWebBackup, LocalWebFileEntry, SiteFile,
};

use std::panic::Location;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use error_location::ErrorLocation;
use log::{debug, warn};
use serde_json::Value;

/// A backup file after format detection and validation. Nothing has been
/// written anywhere yet.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedBackup {
    Archive {
        payload: BackupPayload,
        local_web: Option<LocalWebArchive>,
    },
    Json {
        payload: BackupPayload,
        local_web: Option<LocalWebArchive>,
    },
    Legacy(LegacyExtraction),
}

impl ParsedBackup {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Archive { .. } => "archive",
            Self::Json { .. } => "json",
            Self::Legacy(_) => "legacy",
        }
    }
}

/// Detects the format of `bytes` and runs every check an import needs
/// before it may touch storage.
#[track_caller]
pub fn parse_backup(codec: &ArchiveCodec, bytes: &[u8]) -> CoreResult<ParsedBackup> {
    if is_zip_archive(bytes) {
        let decoded = codec.decode(bytes)?;
        decoded.payload.ensure_supported_version()?;
        return Ok(ParsedBackup::Archive {
            payload: decoded.payload,
            local_web: decoded.local_web,
        });
    }

    let document: Value = serde_json::from_slice(bytes).map_err(|e| {
        debug!("Backup is neither zip nor JSON: {e}");
        CoreError::UnrecognizedFormat {
            location: ErrorLocation::from(Location::caller()),
        }
    })?;

    if BackupPayload::validate(&document) {
        let mut payload = BackupPayload::from_value(document)?;
        payload.ensure_supported_version()?;
        let local_web = payload.data.local_web.take().map(inline_local_web);
        return Ok(ParsedBackup::Json { payload, local_web });
    }

    extract_legacy_state(&document).map(ParsedBackup::Legacy)
}

/// Turns a JSON backup's local web section into records. Files whose
/// base64 data is missing or undecodable are skipped.
pub fn inline_local_web(backup: LocalWebBackup) -> LocalWebArchive {
    let files = backup
        .files
        .into_iter()
        .filter_map(|entry| {
            let data = entry.data_base64.as_deref()?;
            match BASE64.decode(data) {
                Ok(bytes) => Some(SiteFile::from_meta(entry.meta, bytes)),
                Err(e) => {
                    warn!("Skipping {}: invalid base64 data: {e}", entry.meta.key);
                    None
                }
            }
        })
        .collect();

    LocalWebArchive {
        sites: backup.sites,
        files,
    }
}

/// Inverse of [`inline_local_web`], for plain-JSON exports.
pub fn embed_local_web(archive: &LocalWebArchive) -> LocalWebBackup {
    LocalWebBackup {
        sites: archive.sites.clone(),
        files: archive
            .files
            .iter()
            .map(|file| LocalWebFileEntry {
                meta: file.meta(),
                data_base64: Some(BASE64.encode(&file.bytes)),
            })
            .collect(),
    }
}
