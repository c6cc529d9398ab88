mod common;

use common::{create_memory_kv, create_sqlite_kv, create_test_pool};

use desk_core::{StorageKind, WidgetDataEntry};
use desk_db::{
    BlobStore, FilePrimaryStore, INDIRECT_SENTINEL, KeyValueStore, MemoryBlobStore,
    MemoryPrimaryStore, PrimaryStore, StorageEvent,
};

use std::collections::BTreeMap;
use std::sync::Arc;

use googletest::prelude::*;
use serde_json::{Value, json};
use tokio::sync::broadcast::error::TryRecvError;

const THRESHOLD: usize = 200_000;

/// A JSON string whose serialized form is exactly `len` bytes
fn string_of_serialized_len(len: usize) -> String {
    "x".repeat(len - 2)
}

#[tokio::test]
async fn given_value_at_threshold_when_set_then_primary_holds_literal() {
    // Given
    let (primary, blobs, kv) = create_memory_kv(THRESHOLD);
    let value = string_of_serialized_len(THRESHOLD);

    // When
    let kind = kv.set("notepad-content-html", &value).await.unwrap();

    // Then
    assert_that!(kind, eq(StorageKind::Direct));
    let stored = primary.get("notepad-content-html").unwrap().unwrap();
    assert_that!(stored.len(), eq(THRESHOLD));
    assert_that!(stored, eq(&serde_json::to_string(&value).unwrap()));
    assert!(blobs.is_empty().await);

    let read: Option<String> = kv.get("notepad-content-html").await.unwrap();
    assert_that!(read, some(eq(&value)));
}

#[tokio::test]
async fn given_value_over_threshold_when_set_then_primary_holds_sentinel() {
    // Given
    let (primary, blobs, kv) = create_memory_kv(THRESHOLD);
    let value = string_of_serialized_len(THRESHOLD + 1);

    // When
    let kind = kv.set("image-carousel-images", &value).await.unwrap();

    // Then
    assert_that!(kind, eq(StorageKind::Indirect));
    assert_that!(
        primary.get("image-carousel-images").unwrap(),
        some(eq(INDIRECT_SENTINEL))
    );
    assert_that!(blobs.len().await, eq(1));

    let read: Option<String> = kv.get("image-carousel-images").await.unwrap();
    assert_that!(read, some(eq(&value)));
}

#[tokio::test]
async fn given_structured_values_when_round_tripped_then_equal() {
    let (_, _, kv) = create_memory_kv(THRESHOLD);
    let small = json!({ "tasks": [{ "text": "corregir", "done": false }] });
    let large = json!({ "images": vec!["data:image/png;base64,AAAA"; 20_000] });

    kv.set("work-list-tasks", &small).await.unwrap();
    kv.set("image-carousel-images", &large).await.unwrap();

    let small_back: Option<Value> = kv.get("work-list-tasks").await.unwrap();
    let large_back: Option<Value> = kv.get("image-carousel-images").await.unwrap();
    assert_that!(small_back, some(eq(&small)));
    assert_that!(large_back, some(eq(&large)));
}

#[tokio::test]
async fn given_spilled_key_when_set_small_then_stale_blob_removed() {
    let (primary, blobs, kv) = create_memory_kv(10);

    kv.set("spinner-options", &"a much longer value").await.unwrap();
    assert_that!(blobs.len().await, eq(1));

    kv.set("spinner-options", &"short").await.unwrap();

    assert_that!(
        primary.get("spinner-options").unwrap(),
        some(eq("\"short\""))
    );
    assert!(blobs.is_empty().await);
}

#[tokio::test]
async fn given_primary_quota_when_write_exceeds_then_falls_back_and_warns_once() {
    // Given: a primary store too small for the values
    let primary = Arc::new(MemoryPrimaryStore::with_quota(64));
    let blobs = Arc::new(MemoryBlobStore::new());
    let kv = KeyValueStore::new(primary.clone(), blobs.clone(), THRESHOLD);
    let mut events = kv.subscribe();

    // When: two writes overflow the quota
    let first = kv.set("scoreboard-players", &"p".repeat(100)).await.unwrap();
    let second = kv.set("tictactoe-players", &"q".repeat(100)).await.unwrap();

    // Then: both land in the blob store and are readable
    assert_that!(first, eq(StorageKind::Indirect));
    assert_that!(second, eq(StorageKind::Indirect));
    assert_that!(
        primary.get("scoreboard-players").unwrap(),
        some(eq(INDIRECT_SENTINEL))
    );
    let read: Option<String> = kv.get("tictactoe-players").await.unwrap();
    assert_that!(read, some(eq(&"q".repeat(100))));

    // And: exactly one notification was sent
    assert_eq!(events.try_recv(), Ok(StorageEvent::QuotaExceeded));
    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    assert!(kv.quota_warned());
}

#[tokio::test]
async fn given_new_adapter_when_quota_exceeded_then_warns_again() {
    let primary = Arc::new(MemoryPrimaryStore::with_quota(64));
    let blobs = Arc::new(MemoryBlobStore::new());

    let first = KeyValueStore::new(primary.clone(), blobs.clone(), THRESHOLD);
    first.set("a", &"x".repeat(100)).await.unwrap();
    assert!(first.quota_warned());

    let second = KeyValueStore::new(primary.clone(), blobs.clone(), THRESHOLD);
    let mut events = second.subscribe();
    assert!(!second.quota_warned());

    second.set("b", &"y".repeat(100)).await.unwrap();

    assert_eq!(events.try_recv(), Ok(StorageEvent::QuotaExceeded));
}

#[tokio::test]
async fn given_key_when_removed_then_gone_from_both_stores() {
    let (primary, blobs, kv) = create_memory_kv(4);
    kv.set("traffic-light-state", &"red-amber").await.unwrap();

    kv.remove("traffic-light-state").await.unwrap();

    assert_that!(primary.get("traffic-light-state").unwrap(), none());
    assert_that!(blobs.get("traffic-light-state").await.unwrap(), none());
    let read: Option<String> = kv.get("traffic-light-state").await.unwrap();
    assert_that!(read, none());
}

#[tokio::test]
async fn given_mixed_keys_when_exported_then_entries_reflect_storage() {
    // Given
    let (primary, _, kv) = create_memory_kv(16);
    kv.set("toolbar-hidden", &true).await.unwrap();
    kv.set("notepad-content-html", &"<p>long enough to spill</p>")
        .await
        .unwrap();
    primary.set("profile-order", "").unwrap();

    // When
    let entries = kv
        .export_entries(&["toolbar-hidden", "notepad-content-html", "profile-order", "missing"])
        .await
        .unwrap();

    // Then
    assert_that!(entries.len(), eq(2));
    assert_that!(entries["toolbar-hidden"], eq(&WidgetDataEntry::direct("true".to_string())));
    assert_that!(
        entries["notepad-content-html"],
        eq(&WidgetDataEntry::indirect("\"<p>long enough to spill</p>\"".to_string()))
    );
}

#[tokio::test]
async fn given_entries_when_imported_then_placement_follows_kind_and_size() {
    let (primary, blobs, kv) = create_memory_kv(16);
    let mut entries = BTreeMap::new();
    entries.insert("a".to_string(), WidgetDataEntry::indirect("\"tiny\"".to_string()));
    entries.insert("b".to_string(), WidgetDataEntry::direct("\"this one is too long\"".to_string()));
    entries.insert("c".to_string(), WidgetDataEntry::direct("1".to_string()));
    blobs.set("c", "stale").await.unwrap();

    kv.import_entries(&entries).await.unwrap();

    assert_that!(primary.get("a").unwrap(), some(eq(INDIRECT_SENTINEL)));
    assert_that!(primary.get("b").unwrap(), some(eq(INDIRECT_SENTINEL)));
    assert_that!(primary.get("c").unwrap(), some(eq("1")));
    assert_that!(blobs.get("c").await.unwrap(), none());
    assert_that!(kv.get_raw("a").await.unwrap(), some(eq("\"tiny\"")));
}

#[tokio::test]
async fn given_sqlite_blobs_when_value_spills_then_round_trips() {
    let pool = create_test_pool().await;
    let primary = Arc::new(MemoryPrimaryStore::new());
    let kv = create_sqlite_kv(&pool, primary.clone());
    let value = "z".repeat(THRESHOLD + 10);

    kv.set("attendance-records", &value).await.unwrap();

    let read: Option<String> = kv.get("attendance-records").await.unwrap();
    assert_that!(read, some(eq(&value)));

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM kv_blobs")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_that!(count, eq(1));
}

#[tokio::test]
async fn given_file_primary_store_when_reopened_then_values_persist() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("primary.json");

    {
        let store = FilePrimaryStore::open(&path, None).unwrap();
        store.set("i18nextLng", "\"es\"").unwrap();
        store.set("widgets-view-mode", "\"grid\"").unwrap();
        store.remove("widgets-view-mode").unwrap();
    }

    let reopened = FilePrimaryStore::open(&path, None).unwrap();
    assert_that!(reopened.get("i18nextLng").unwrap(), some(eq("\"es\"")));
    assert_that!(reopened.keys().unwrap(), len(eq(1)));
}

#[test]
fn given_file_primary_store_with_quota_when_exceeded_then_file_untouched() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("primary.json");
    let store = FilePrimaryStore::open(&path, Some(20)).unwrap();
    store.set("k", "\"small\"").unwrap();

    let result = store.set("k2", "\"definitely too large\"");

    assert!(result.is_err_and(|e| e.is_quota_exceeded()));
    let reopened = FilePrimaryStore::open(&path, None).unwrap();
    assert_that!(reopened.get("k2").unwrap(), none());
    assert_that!(reopened.get("k").unwrap(), some(eq("\"small\"")));
}
