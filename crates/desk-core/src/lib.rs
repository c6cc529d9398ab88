pub mod backup;
pub mod error;
pub mod models;
pub mod tracker;

pub use backup::archive::{ArchiveCodec, DecodedArchive, EncodeOptions, ProgressFn, YieldFn};
pub use backup::legacy::{LegacyExtraction, LegacyStrategy};
pub use backup::payload::{BACKUP_APP_NAME, BACKUP_VERSION, BackupData, BackupMeta, BackupPayload};
pub use backup::{ParsedBackup, embed_local_web, inline_local_web, parse_backup};
pub use error::{CoreError, CoreResult};
pub use models::desktop_profile::{DesktopProfile, ProfileCollection};
pub use models::local_web::{
    LocalWebArchive, LocalWebBackup, LocalWebFileEntry, LocalWebMeta, LocalWebStats,
};
pub use models::profile_filter::ProfileFilter;
pub use models::site::{Site, now_millis, owner_name};
pub use models::site_file::{SiteFile, SiteFileMeta};
pub use models::widget_data::{StorageKind, WidgetDataEntry};
pub use tracker::migration::{Migrated, migrate_tracker_state};
pub use tracker::state::{ClassRoom, Student, TRACKER_STORAGE_KEY, TrackerState, TrackerUi};

#[cfg(test)]
mod tests;
