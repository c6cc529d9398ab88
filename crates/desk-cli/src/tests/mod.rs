
use crate::DeskApp;

use desk_core::{ArchiveCodec, Site, SiteFile};
use desk_db::{
    KeyValueStore, MemoryBlobStore, MemoryPrimaryStore, SiteArchiveRepository, open_in_memory_pool,
};

use std::sync::Arc;

pub(crate) struct TestDesk {
    pub(crate) kv: Arc<KeyValueStore>,
    pub(crate) sites: Arc<SiteArchiveRepository>,
    pub(crate) app: DeskApp,
}

/// App over in-memory stores; `quota` caps the primary store.
pub(crate) async fn create_test_desk(quota: Option<usize>) -> TestDesk {
    let pool = open_in_memory_pool().await.unwrap();
    let primary = match quota {
        Some(bytes) => MemoryPrimaryStore::with_quota(bytes),
        None => MemoryPrimaryStore::new(),
    };
    let kv = Arc::new(KeyValueStore::new(
        Arc::new(primary),
        Arc::new(MemoryBlobStore::new()),
        desk_db::DEFAULT_SPILL_THRESHOLD_BYTES,
    ));
    let sites = Arc::new(SiteArchiveRepository::new(pool));
    let app = DeskApp::from_parts(kv.clone(), sites.clone(), ArchiveCodec::default(), 2);
    TestDesk { kv, sites, app }
}

/// Saves a site owned by `profile` with `file_count` small files.
pub(crate) async fn seed_site(
    desk: &TestDesk,
    name: &str,
    profile: Option<&str>,
    file_count: usize,
) {
    let mut site = Site::new(name.to_string(), profile.map(str::to_string));
    let files: Vec<SiteFile> = (0..file_count)
        .map(|i| {
            SiteFile::new(
                site.id,
                format!("page{i}.html"),
                "text/html".to_string(),
                format!("<p>{name} {i}</p>").into_bytes(),
            )
        })
        .collect();
    site.file_count = files.len() as u64;
    site.total_bytes = files.iter().map(|f| f.size).sum();
    desk.sites.save_site(&site, &files).await.unwrap();
}
