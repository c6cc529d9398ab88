use crate::commands::{BackupFormat, Commands};
use crate::error::{CliError, CliErrorResult};

use desk_config::Config;
use desk_core::{ArchiveCodec, EncodeOptions, ProfileFilter, YieldFn};
use desk_db::{
    DbError, ExportRequest, ExportService, FilePrimaryStore, ImportOptions, ImportService,
    KeyValueStore, PrimaryStore, SiteArchiveRepository, SqliteBlobStore, StorageEvent, open_pool,
};

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use futures::FutureExt;
use log::{info, warn};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// The stores and services one `desk` invocation works against.
pub struct DeskApp {
    kv: Arc<KeyValueStore>,
    sites: Arc<SiteArchiveRepository>,
    codec: ArchiveCodec,
    import_batch_size: usize,
}

impl DeskApp {
    /// Opens the primary file, the site database and its blob table as
    /// configured.
    pub async fn open(config: &Config) -> CliErrorResult<Self> {
        let pool = open_pool(&config.database_path()?).await?;

        let primary = FilePrimaryStore::open(
            config.primary_store_path()?,
            config.storage.primary_quota_bytes,
        )
        .map_err(DbError::from)?;
        let primary: Arc<dyn PrimaryStore> = Arc::new(primary);
        let blobs = Arc::new(SqliteBlobStore::new(pool.clone()));

        let kv = KeyValueStore::new(primary, blobs, config.storage.spill_threshold_bytes);
        let codec = ArchiveCodec::new(config.archive.compression_level).map_err(DbError::from)?;

        Ok(Self::from_parts(
            Arc::new(kv),
            Arc::new(SiteArchiveRepository::new(pool)),
            codec,
            config.archive.import_batch_size,
        ))
    }

    pub fn from_parts(
        kv: Arc<KeyValueStore>,
        sites: Arc<SiteArchiveRepository>,
        codec: ArchiveCodec,
        import_batch_size: usize,
    ) -> Self {
        Self {
            kv,
            sites,
            codec,
            import_batch_size,
        }
    }

    /// Runs one command and returns its JSON report.
    pub async fn run(
        &self,
        command: Commands,
        cancel: &CancellationToken,
    ) -> CliErrorResult<Value> {
        let mut events = self.kv.subscribe();

        let mut report = match command {
            Commands::Export {
                output,
                profiles,
                fallback_profile,
                widget_keys,
                no_local_web,
                format,
            } => {
                let request = ExportRequest {
                    profile_names: non_empty(profiles),
                    fallback_profile,
                    widget_keys: non_empty(widget_keys),
                    include_local_web: !no_local_web,
                };
                self.export(&output, &request, format, cancel).await?
            }
            Commands::Import {
                input,
                profile_map,
                fallback_profile,
            } => {
                let profile_map: HashMap<String, String> = profile_map.into_iter().collect();
                self.import(&input, &profile_map, fallback_profile.as_deref(), cancel)
                    .await?
            }
            Commands::Stats { profiles } => {
                let stats = self
                    .sites
                    .stats(ProfileFilter::from_option(non_empty_slice(&profiles)))
                    .await?;
                serde_json::to_value(stats)?
            }
            Commands::Sites { profiles } => {
                let sites = self
                    .sites
                    .list_sites(ProfileFilter::from_option(non_empty_slice(&profiles)))
                    .await?;
                serde_json::to_value(sites)?
            }
            Commands::CloneProfile { source, target } => {
                let cloned = self.sites.clone_profile(&source, &target).await?;
                json!({ "source": source, "target": target, "clonedSites": cloned })
            }
        };

        if matches!(events.try_recv(), Ok(StorageEvent::QuotaExceeded))
            && let Value::Object(map) = &mut report
        {
            map.insert(String::from("quotaExceeded"), Value::Bool(true));
        }

        Ok(report)
    }

    async fn export(
        &self,
        output: &Path,
        request: &ExportRequest,
        format: BackupFormat,
        cancel: &CancellationToken,
    ) -> CliErrorResult<Value> {
        let service = ExportService::new(self.kv.clone(), self.sites.clone(), self.codec);

        let outcome = match format {
            BackupFormat::Zip => {
                let on_progress = |done: usize, total: usize| {
                    info!("Archived {done}/{total} files");
                };
                let yield_control: YieldFn = &|| tokio::task::yield_now().boxed();
                let options = EncodeOptions {
                    on_progress: Some(&on_progress),
                    yield_control: Some(yield_control),
                    cancel: Some(cancel),
                };
                service.export(request, options).await?
            }
            BackupFormat::Json => service.export_json(request).await?,
        };

        tokio::fs::write(output, &outcome.bytes)
            .await
            .map_err(|e| CliError::io(output, e))?;

        Ok(json!({
            "output": output.display().to_string(),
            "format": format_name(format),
            "bytes": outcome.bytes.len(),
            "profileCount": outcome.profile_count,
            "widgetCount": outcome.widget_count,
            "siteCount": outcome.site_count,
            "fileCount": outcome.file_count,
        }))
    }

    async fn import(
        &self,
        input: &Path,
        profile_map: &HashMap<String, String>,
        fallback_profile: Option<&str>,
        cancel: &CancellationToken,
    ) -> CliErrorResult<Value> {
        let bytes = tokio::fs::read(input)
            .await
            .map_err(|e| CliError::io(input, e))?;

        let on_progress = |done: usize, total: usize| {
            info!("Restored {done}/{total} files");
        };
        let yield_control: YieldFn = &|| tokio::task::yield_now().boxed();
        let options = ImportOptions {
            profile_name_map: (!profile_map.is_empty()).then_some(profile_map),
            fallback_profile_name: fallback_profile,
            batch_size: Some(self.import_batch_size),
            on_progress: Some(&on_progress),
            yield_control: Some(yield_control),
            cancel: Some(cancel),
        };

        let service = ImportService::new(self.kv.clone(), self.sites.clone(), self.codec);
        let summary = service.import(&bytes, options).await?;
        if self.kv.quota_warned() {
            warn!("Local storage is full; some widget data was kept in the database instead");
        }

        Ok(serde_json::to_value(summary)?)
    }
}

fn format_name(format: BackupFormat) -> &'static str {
    match format {
        BackupFormat::Zip => "zip",
        BackupFormat::Json => "json",
    }
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    (!values.is_empty()).then_some(values)
}

fn non_empty_slice(values: &[String]) -> Option<&[String]> {
    (!values.is_empty()).then_some(values)
}
