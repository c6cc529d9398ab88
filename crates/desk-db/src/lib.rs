pub mod connection;
pub mod error;
pub mod kv;
pub mod repositories;
pub mod sync;

pub use connection::database::{open_in_memory_pool, open_pool};
pub use error::{DbError, Result};
pub use kv::blob::{BlobStore, MemoryBlobStore, SqliteBlobStore};
pub use kv::error::{KvError, KvResult};
pub use kv::keys::{ACTIVE_PROFILE_KEY, PROFILES_KEY, WIDGET_DATA_KEYS};
pub use kv::primary::{FilePrimaryStore, MemoryPrimaryStore, PrimaryStore};
pub use kv::store::{
    DEFAULT_SPILL_THRESHOLD_BYTES, INDIRECT_SENTINEL, KeyValueStore, StorageEvent,
};
pub use repositories::site_archive_repository::{
    DEFAULT_IMPORT_BATCH_SIZE, RecordImportOptions, SiteArchiveRepository,
};
pub use sync::export::{ExportOutcome, ExportRequest, ExportService};
pub use sync::import::{ImportOptions, ImportService, ImportSummary};
pub use sync::tracker::load_tracker_state;
