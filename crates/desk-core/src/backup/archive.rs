//! Zip container for backups.
//!
//! Layout:
//!
//! ```text
//! manifest.json              BackupPayload (required)
//! localWeb/meta.json         sites + file metadata, no bytes (optional)
//! localWeb/files/<file key>  raw bytes of one file record (0..n)
//! ```
//!
//! Every entry is deflated at the codec's compression level.

use crate::{
    BackupPayload, CoreError, CoreResult, LocalWebArchive, LocalWebMeta, SiteFile,
};

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, Write};
use std::panic::Location;

use error_location::ErrorLocation;
use futures::future::BoxFuture;
use log::{debug, info};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const MANIFEST_ENTRY: &str = "manifest.json";
pub const LOCAL_WEB_META_ENTRY: &str = "localWeb/meta.json";
pub const LOCAL_WEB_FILES_PREFIX: &str = "localWeb/files/";

pub const DEFAULT_COMPRESSION_LEVEL: i64 = 6;
const MAX_COMPRESSION_LEVEL: i64 = 9;

/// Local file header signature (`PK\x03\x04`).
pub const ZIP_MAGIC: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];

/// Called after each file entry with `(completed, total)`.
pub type ProgressFn<'a> = &'a (dyn Fn(usize, usize) + Send + Sync);

/// Awaited between file entries so the host can run other work.
pub type YieldFn<'a> = &'a (dyn Fn() -> BoxFuture<'static, ()> + Send + Sync);

#[derive(Clone, Copy, Default)]
pub struct EncodeOptions<'a> {
    pub on_progress: Option<ProgressFn<'a>>,
    pub yield_control: Option<YieldFn<'a>>,
    pub cancel: Option<&'a CancellationToken>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedArchive {
    pub payload: BackupPayload,
    pub local_web: Option<LocalWebArchive>,
}

/// True when `bytes` start like a zip container rather than a JSON backup.
pub fn is_zip_archive(bytes: &[u8]) -> bool {
    bytes.starts_with(&ZIP_MAGIC)
}

pub fn file_entry_name(key: &str) -> String {
    format!("{LOCAL_WEB_FILES_PREFIX}{key}")
}

#[derive(Debug, Clone, Copy)]
pub struct ArchiveCodec {
    compression_level: i64,
}

impl Default for ArchiveCodec {
    fn default() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl ArchiveCodec {
    #[track_caller]
    pub fn new(compression_level: i64) -> CoreResult<Self> {
        if !(0..=MAX_COMPRESSION_LEVEL).contains(&compression_level) {
            return Err(CoreError::validation(format!(
                "compression level must be between 0 and {MAX_COMPRESSION_LEVEL}, got {compression_level}"
            )));
        }
        Ok(Self { compression_level })
    }

    pub fn compression_level(&self) -> i64 {
        self.compression_level
    }

    /// Packs `payload` and, when given, the local web records into one zip.
    ///
    /// The cancellation token is checked before each file entry. Once it is
    /// observed the partially written archive is dropped and `Aborted` is
    /// returned.
    pub async fn encode(
        &self,
        payload: &BackupPayload,
        records: Option<&LocalWebArchive>,
        options: EncodeOptions<'_>,
    ) -> CoreResult<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        let manifest = serde_json::to_vec(payload)?;
        self.add_entry(&mut writer, MANIFEST_ENTRY, &manifest)?;

        if let Some(records) = records {
            let meta = serde_json::to_vec(&records.meta())?;
            self.add_entry(&mut writer, LOCAL_WEB_META_ENTRY, &meta)?;

            let total = records.files.len();
            for (index, file) in records.files.iter().enumerate() {
                if options.cancel.is_some_and(CancellationToken::is_cancelled) {
                    info!("Archive encode cancelled after {index} of {total} files");
                    return Err(CoreError::aborted());
                }

                self.add_entry(&mut writer, &file_entry_name(&file.key), &file.bytes)?;

                if let Some(on_progress) = options.on_progress {
                    on_progress(index + 1, total);
                }
                if let Some(yield_control) = options.yield_control {
                    yield_control().await;
                }
            }
        }

        let cursor = writer
            .finish()
            .map_err(|e| CoreError::archive_write(e.to_string()))?;
        let bytes = cursor.into_inner();

        debug!("Archive encoded: {} bytes", bytes.len());
        Ok(bytes)
    }

    /// Unpacks an archive produced by [`ArchiveCodec::encode`].
    ///
    /// File metadata without a matching byte entry is dropped, not reported.
    #[track_caller]
    pub fn decode(&self, bytes: &[u8]) -> CoreResult<DecodedArchive> {
        let entries = read_entries(bytes)?;

        let manifest = entries
            .get(MANIFEST_ENTRY)
            .ok_or_else(|| CoreError::MissingManifest {
                location: ErrorLocation::from(Location::caller()),
            })?;
        let candidate: Value = serde_json::from_slice(manifest)
            .map_err(|e| CoreError::invalid_payload(format!("manifest.json: {e}")))?;
        let payload = BackupPayload::from_value(candidate)?;

        let Some(meta_bytes) = entries.get(LOCAL_WEB_META_ENTRY) else {
            return Ok(DecodedArchive {
                payload,
                local_web: None,
            });
        };
        let meta: LocalWebMeta = serde_json::from_slice(meta_bytes)
            .map_err(|e| CoreError::malformed_archive(format!("{LOCAL_WEB_META_ENTRY}: {e}")))?;

        let mut files = Vec::with_capacity(meta.files.len());
        for file_meta in meta.files {
            match entries.get(&file_entry_name(&file_meta.key)) {
                Some(bytes) => files.push(SiteFile::from_meta(file_meta, bytes.clone())),
                None => debug!("Skipping {}: no bytes in archive", file_meta.key),
            }
        }

        Ok(DecodedArchive {
            payload,
            local_web: Some(LocalWebArchive {
                sites: meta.sites,
                files,
            }),
        })
    }

    fn entry_options(&self, len: usize) -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(self.compression_level))
            .large_file(len as u64 >= u64::from(u32::MAX))
    }

    fn add_entry<W: Write + Seek>(
        &self,
        writer: &mut ZipWriter<W>,
        name: &str,
        bytes: &[u8],
    ) -> CoreResult<()> {
        writer
            .start_file(name, self.entry_options(bytes.len()))
            .map_err(|e| CoreError::archive_write(format!("{name}: {e}")))?;
        writer
            .write_all(bytes)
            .map_err(|e| CoreError::archive_write(format!("{name}: {e}")))?;
        Ok(())
    }
}

fn read_entries(bytes: &[u8]) -> CoreResult<HashMap<String, Vec<u8>>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| CoreError::malformed_archive(e.to_string()))?;

    let mut entries = HashMap::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| CoreError::malformed_archive(format!("entry {index}: {e}")))?;
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        let mut contents = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry
            .read_to_end(&mut contents)
            .map_err(|e| CoreError::malformed_archive(format!("{name}: {e}")))?;
        entries.insert(name, contents);
    }

    Ok(entries)
}
