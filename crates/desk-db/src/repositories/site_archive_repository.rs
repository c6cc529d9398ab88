//! Persistent store of imported "local web" sites and their files.
//!
//! Sites carry an optional owning profile. A site without one is shared:
//! it matches every [`ProfileFilter`] and is duplicated, not moved, when a
//! profile is cloned.
//!
//! Every operation that writes more than one row runs in a single
//! transaction, except [`SiteArchiveRepository::import_records`], which
//! commits its files batch by batch so a large restore can report progress
//! and be cancelled between batches.

use crate::{DbError, Result as DbErrorResult};

use desk_core::{
    LocalWebArchive, LocalWebStats, ProfileFilter, ProgressFn, Site, SiteFile, YieldFn,
    now_millis, owner_name,
};

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::{debug, info};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub const DEFAULT_IMPORT_BATCH_SIZE: usize = 50;

const SITE_COLUMNS: &str =
    "id, name, profile_name, created_at, updated_at, file_count, total_bytes";
const FILE_COLUMNS: &str = "key, site_id, path, mime_type, size, profile_name, bytes";

/// How [`SiteArchiveRepository::import_records`] attributes and paces a
/// restore.
#[derive(Clone, Copy)]
pub struct RecordImportOptions<'a> {
    /// Renames profiles found in the archive.
    pub profile_name_map: Option<&'a HashMap<String, String>>,
    /// Owner for records the archive leaves unattributed.
    pub fallback_profile_name: Option<&'a str>,
    pub batch_size: usize,
    pub on_progress: Option<ProgressFn<'a>>,
    pub yield_control: Option<YieldFn<'a>>,
    pub cancel: Option<&'a CancellationToken>,
}

impl Default for RecordImportOptions<'_> {
    fn default() -> Self {
        Self {
            profile_name_map: None,
            fallback_profile_name: None,
            batch_size: DEFAULT_IMPORT_BATCH_SIZE,
            on_progress: None,
            yield_control: None,
            cancel: None,
        }
    }
}

impl RecordImportOptions<'_> {
    fn resolve_profile(&self, profile_name: Option<&str>) -> Option<String> {
        let profile_name = profile_name.filter(|name| !name.is_empty());
        let mapped = profile_name
            .and_then(|name| self.profile_name_map.and_then(|map| map.get(name)));

        mapped
            .map(String::as_str)
            .or(profile_name)
            .or(self.fallback_profile_name)
            .map(str::to_string)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(CancellationToken::is_cancelled)
    }
}

pub struct SiteArchiveRepository {
    pool: SqlitePool,
}

impl SiteArchiveRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Sites visible to `filter`, oldest first.
    pub async fn list_sites(&self, filter: ProfileFilter<'_>) -> DbErrorResult<Vec<Site>> {
        let mut conn = self.pool.acquire().await?;
        let sites = fetch_all_sites(&mut *conn).await?;

        Ok(sites
            .into_iter()
            .filter(|site| filter.includes(site.profile_name.as_deref()))
            .collect())
    }

    pub async fn list_files(&self, site_ids: &[Uuid]) -> DbErrorResult<Vec<SiteFile>> {
        let mut conn = self.pool.acquire().await?;
        fetch_files_for_sites(&mut *conn, site_ids).await
    }

    pub async fn find_site(&self, id: Uuid) -> DbErrorResult<Option<Site>> {
        let row = sqlx::query(&format!("SELECT {SITE_COLUMNS} FROM sites WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(site_from_row).transpose()
    }

    /// Site count and byte total for `filter`.
    ///
    /// Bytes are summed from stored files; when that comes to zero the
    /// sites' cached totals are used instead.
    pub async fn stats(&self, filter: ProfileFilter<'_>) -> DbErrorResult<LocalWebStats> {
        let sites = self.list_sites(filter).await?;

        let rows = sqlx::query(
            "SELECT site_id, COALESCE(SUM(size), 0) AS bytes FROM site_files GROUP BY site_id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut bytes_by_site = HashMap::with_capacity(rows.len());
        for row in rows {
            let site_id: String = row.try_get("site_id")?;
            let bytes: i64 = row.try_get("bytes")?;
            bytes_by_site.insert(site_id, to_u64(bytes));
        }

        let bytes_from_files: u64 = sites
            .iter()
            .filter_map(|site| bytes_by_site.get(&site.id.to_string()))
            .sum();
        let bytes_from_sites: u64 = sites.iter().map(|site| site.total_bytes).sum();

        Ok(LocalWebStats {
            site_count: sites.len() as u64,
            total_bytes: if bytes_from_files > 0 {
                bytes_from_files
            } else {
                bytes_from_sites
            },
        })
    }

    pub async fn clear(&self) -> DbErrorResult<()> {
        let mut tx = self.pool.begin().await?;

        let files = sqlx::query("DELETE FROM site_files")
            .execute(&mut *tx)
            .await?;
        let sites = sqlx::query("DELETE FROM sites").execute(&mut *tx).await?;

        tx.commit().await?;

        info!(
            "Cleared local web archive ({} sites, {} files)",
            sites.rows_affected(),
            files.rows_affected()
        );
        Ok(())
    }

    /// Inserts or replaces one site together with its files.
    pub async fn save_site(&self, site: &Site, files: &[SiteFile]) -> DbErrorResult<()> {
        let mut tx = self.pool.begin().await?;

        upsert_site(&mut *tx, site).await?;
        for file in files {
            upsert_file(&mut *tx, file).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Copies every site owned by `source`, plus every shared site, into
    /// `target`. Shared sites that were copied become owned by `source`.
    ///
    /// Returns the number of sites created.
    pub async fn clone_profile(&self, source: &str, target: &str) -> DbErrorResult<usize> {
        let mut tx = self.pool.begin().await?;

        let source_sites: Vec<Site> = fetch_all_sites(&mut *tx)
            .await?
            .into_iter()
            .filter(|site| site.is_shared() || site.profile_name.as_deref() == Some(source))
            .collect();

        if source_sites.is_empty() {
            debug!("Profile '{source}' has no sites to clone");
            return Ok(0);
        }

        let now = now_millis();
        for site in &source_sites {
            let clone = Site {
                id: Uuid::new_v4(),
                profile_name: Some(target.to_string()),
                created_at: now,
                updated_at: now,
                ..site.clone()
            };

            let files = fetch_files_for_sites(&mut *tx, &[site.id]).await?;
            upsert_site(&mut *tx, &clone).await?;
            for file in &files {
                let mut copy = file.rekeyed(clone.id);
                copy.profile_name = Some(target.to_string());
                upsert_file(&mut *tx, &copy).await?;
            }

            if site.is_shared() {
                sqlx::query("UPDATE sites SET profile_name = ? WHERE id = ?")
                    .bind(source)
                    .bind(site.id.to_string())
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;

        info!(
            "Cloned {} sites from profile '{source}' to '{target}'",
            source_sites.len()
        );
        Ok(source_sites.len())
    }

    /// Sites visible to `filter` and their files, with `fallback_profile`
    /// filled in wherever no owner is recorded.
    pub async fn export_records(
        &self,
        filter: ProfileFilter<'_>,
        fallback_profile: Option<&str>,
    ) -> DbErrorResult<LocalWebArchive> {
        let fallback = || fallback_profile.map(str::to_string);

        let sites: Vec<Site> = self
            .list_sites(filter)
            .await?
            .into_iter()
            .map(|site| Site {
                profile_name: site.profile_name.or_else(fallback),
                ..site
            })
            .collect();

        let site_ids: Vec<Uuid> = sites.iter().map(|site| site.id).collect();
        let files = self
            .list_files(&site_ids)
            .await?
            .into_iter()
            .map(|file| SiteFile {
                profile_name: file.profile_name.or_else(fallback),
                ..file
            })
            .collect();

        Ok(LocalWebArchive { sites, files })
    }

    /// Writes an archive's sites in one transaction, then its files in
    /// batches of `options.batch_size`, one transaction per batch.
    pub async fn import_records(
        &self,
        archive: &LocalWebArchive,
        options: RecordImportOptions<'_>,
    ) -> DbErrorResult<()> {
        if options.is_cancelled() {
            return Err(DbError::aborted());
        }

        let mut tx = self.pool.begin().await?;
        for site in &archive.sites {
            let site = Site {
                profile_name: options.resolve_profile(site.profile_name.as_deref()),
                ..site.clone()
            };
            upsert_site(&mut *tx, &site).await?;
        }
        tx.commit().await?;

        let total = archive.files.len();
        let mut done = 0;
        for batch in archive.files.chunks(options.batch_size.max(1)) {
            if options.is_cancelled() {
                info!("Local web import cancelled after {done} of {total} files");
                return Err(DbError::aborted());
            }

            let mut tx = self.pool.begin().await?;
            for file in batch {
                let file = SiteFile {
                    profile_name: options.resolve_profile(file.profile_name.as_deref()),
                    ..file.clone()
                };
                upsert_file(&mut *tx, &file).await?;
            }
            tx.commit().await?;

            done += batch.len();
            if let Some(on_progress) = options.on_progress {
                on_progress(done, total);
            }
            if let Some(yield_control) = options.yield_control {
                yield_control().await;
            }
        }

        info!(
            "Imported {} sites and {total} files into the local web archive",
            archive.sites.len()
        );
        Ok(())
    }
}

async fn fetch_all_sites(conn: &mut SqliteConnection) -> DbErrorResult<Vec<Site>> {
    let rows = sqlx::query(&format!(
        "SELECT {SITE_COLUMNS} FROM sites ORDER BY created_at, id"
    ))
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(site_from_row).collect()
}

async fn fetch_files_for_sites(
    conn: &mut SqliteConnection,
    site_ids: &[Uuid],
) -> DbErrorResult<Vec<SiteFile>> {
    if site_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {FILE_COLUMNS} FROM site_files WHERE site_id IN ("));
    let mut separated = query.separated(", ");
    for id in site_ids {
        separated.push_bind(id.to_string());
    }
    separated.push_unseparated(") ORDER BY site_id, path");

    let rows = query.build().fetch_all(&mut *conn).await?;
    rows.iter().map(file_from_row).collect()
}

async fn upsert_site(conn: &mut SqliteConnection, site: &Site) -> DbErrorResult<()> {
    sqlx::query(
        r#"
            INSERT INTO sites (
                id, name, profile_name, created_at, updated_at, file_count, total_bytes
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                profile_name = excluded.profile_name,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at,
                file_count = excluded.file_count,
                total_bytes = excluded.total_bytes
        "#,
    )
    .bind(site.id.to_string())
    .bind(&site.name)
    .bind(&site.profile_name)
    .bind(site.created_at.timestamp_millis())
    .bind(site.updated_at.timestamp_millis())
    .bind(to_i64(site.file_count))
    .bind(to_i64(site.total_bytes))
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn upsert_file(conn: &mut SqliteConnection, file: &SiteFile) -> DbErrorResult<()> {
    sqlx::query(
        r#"
            INSERT INTO site_files (
                key, site_id, path, mime_type, size, profile_name, bytes
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                site_id = excluded.site_id,
                path = excluded.path,
                mime_type = excluded.mime_type,
                size = excluded.size,
                profile_name = excluded.profile_name,
                bytes = excluded.bytes
        "#,
    )
    .bind(&file.key)
    .bind(file.site_id.to_string())
    .bind(&file.path)
    .bind(&file.mime_type)
    .bind(to_i64(file.size))
    .bind(&file.profile_name)
    .bind(&file.bytes)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

fn site_from_row(row: &SqliteRow) -> DbErrorResult<Site> {
    Ok(Site {
        id: parse_uuid("sites", row.try_get("id")?)?,
        name: row.try_get("name")?,
        profile_name: owner_name(row.try_get("profile_name")?),
        created_at: parse_millis("sites", row.try_get("created_at")?)?,
        updated_at: parse_millis("sites", row.try_get("updated_at")?)?,
        file_count: to_u64(row.try_get("file_count")?),
        total_bytes: to_u64(row.try_get("total_bytes")?),
    })
}

fn file_from_row(row: &SqliteRow) -> DbErrorResult<SiteFile> {
    Ok(SiteFile {
        key: row.try_get("key")?,
        site_id: parse_uuid("site_files", row.try_get("site_id")?)?,
        path: row.try_get("path")?,
        mime_type: row.try_get("mime_type")?,
        size: to_u64(row.try_get("size")?),
        profile_name: owner_name(row.try_get("profile_name")?),
        bytes: row.try_get("bytes")?,
    })
}

#[track_caller]
fn parse_uuid(table: &'static str, value: String) -> DbErrorResult<Uuid> {
    Uuid::parse_str(&value).map_err(|e| DbError::corrupt_row(table, format!("id '{value}': {e}")))
}

#[track_caller]
fn parse_millis(table: &'static str, value: i64) -> DbErrorResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value)
        .ok_or_else(|| DbError::corrupt_row(table, format!("timestamp {value} out of range")))
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
