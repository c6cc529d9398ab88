#![allow(dead_code)]

use desk_db::{KeyValueStore, MemoryBlobStore, MemoryPrimaryStore, PrimaryStore, SqliteBlobStore};

use std::sync::Arc;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Creates an in-memory SQLite pool with migrations run
pub async fn create_test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::new()
        .filename(":memory:")
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1) // In-memory needs single connection
        .connect_with(options)
        .await
        .expect("Failed to create test pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Adapter over memory stores with the given threshold
pub fn create_memory_kv(spill_threshold: usize) -> (Arc<MemoryPrimaryStore>, Arc<MemoryBlobStore>, KeyValueStore) {
    let primary = Arc::new(MemoryPrimaryStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let kv = KeyValueStore::new(primary.clone(), blobs.clone(), spill_threshold);
    (primary, blobs, kv)
}

/// Adapter whose blobs live in the test pool
pub fn create_sqlite_kv(pool: &SqlitePool, primary: Arc<dyn PrimaryStore>) -> KeyValueStore {
    KeyValueStore::new(
        primary,
        Arc::new(SqliteBlobStore::new(pool.clone())),
        desk_db::DEFAULT_SPILL_THRESHOLD_BYTES,
    )
}
