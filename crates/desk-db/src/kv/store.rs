//! Key-value adapter over a small primary store and a blob store.
//!
//! Serialized values longer than the spill threshold live in the blob
//! store; the primary store then holds [`INDIRECT_SENTINEL`] under the same
//! key. A primary write that hits its quota is retried the same way, and
//! the first such fallback is announced once on [`KeyValueStore::subscribe`].

use crate::kv::blob::BlobStore;
use crate::kv::error::{KvError, KvResult};
use crate::kv::primary::PrimaryStore;

use desk_core::{StorageKind, WidgetDataEntry};

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;

/// Primary-store value meaning "look in the blob store".
pub const INDIRECT_SENTINEL: &str = "__indexed_db__";

pub const DEFAULT_SPILL_THRESHOLD_BYTES: usize = 200_000;

const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageEvent {
    /// The primary store refused a write and the value went to the blob store.
    QuotaExceeded,
}

pub struct KeyValueStore {
    primary: Arc<dyn PrimaryStore>,
    blobs: Arc<dyn BlobStore>,
    spill_threshold: usize,
    quota_warned: AtomicBool,
    events: broadcast::Sender<StorageEvent>,
}

impl KeyValueStore {
    pub fn new(
        primary: Arc<dyn PrimaryStore>,
        blobs: Arc<dyn BlobStore>,
        spill_threshold: usize,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            primary,
            blobs,
            spill_threshold,
            quota_warned: AtomicBool::new(false),
            events,
        }
    }

    pub fn spill_threshold(&self) -> usize {
        self.spill_threshold
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }

    /// Whether this adapter has already announced a quota fallback.
    pub fn quota_warned(&self) -> bool {
        self.quota_warned.load(Ordering::SeqCst)
    }

    /// The serialized value under `key`, following the sentinel.
    pub async fn get_raw(&self, key: &str) -> KvResult<Option<String>> {
        match self.primary.get(key)? {
            Some(value) if value == INDIRECT_SENTINEL => {
                let blob = self.blobs.get(key).await?;
                if blob.is_none() {
                    warn!("Key '{key}' points to the blob store but no blob exists");
                }
                Ok(blob)
            }
            other => Ok(other),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> KvResult<Option<T>> {
        let Some(raw) = self.get_raw(key).await? else {
            return Ok(None);
        };
        let value = serde_json::from_str(&raw).map_err(|e| KvError::json(key, e))?;
        Ok(Some(value))
    }

    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> KvResult<StorageKind> {
        let serialized = serde_json::to_string(value).map_err(|e| KvError::json(key, e))?;
        self.set_raw(key, serialized).await
    }

    /// Stores an already serialized value and reports where it landed.
    pub async fn set_raw(&self, key: &str, serialized: String) -> KvResult<StorageKind> {
        if serialized.len() > self.spill_threshold {
            debug!(
                "Spilling '{key}' ({} bytes) to the blob store",
                serialized.len()
            );
            self.spill(key, &serialized).await?;
            return Ok(StorageKind::Indirect);
        }

        match self.primary.set(key, &serialized) {
            Ok(()) => {
                self.blobs.remove(key).await?;
                Ok(StorageKind::Direct)
            }
            Err(e) if e.is_quota_exceeded() => {
                warn!("{e}; falling back to the blob store");
                self.blobs.set(key, &serialized).await?;
                self.notify_quota_exceeded();
                self.primary.set(key, INDIRECT_SENTINEL)?;
                Ok(StorageKind::Indirect)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn remove(&self, key: &str) -> KvResult<()> {
        self.primary.remove(key)?;
        self.blobs.remove(key).await
    }

    /// Snapshot of `keys` as widget entries. Absent and empty keys are
    /// skipped, as are sentinels whose blob is gone.
    pub async fn export_entries<S: AsRef<str>>(
        &self,
        keys: &[S],
    ) -> KvResult<BTreeMap<String, WidgetDataEntry>> {
        let mut entries = BTreeMap::new();

        for key in keys.iter().map(AsRef::as_ref) {
            let Some(item) = self.primary.get(key)?.filter(|item| !item.is_empty()) else {
                continue;
            };

            if item == INDIRECT_SENTINEL {
                if let Some(value) = self.blobs.get(key).await? {
                    entries.insert(key.to_string(), WidgetDataEntry::indirect(value));
                }
            } else {
                entries.insert(key.to_string(), WidgetDataEntry::direct(item));
            }
        }

        Ok(entries)
    }

    /// Restores entries produced by [`KeyValueStore::export_entries`].
    pub async fn import_entries(
        &self,
        entries: &BTreeMap<String, WidgetDataEntry>,
    ) -> KvResult<()> {
        for (key, entry) in entries {
            match entry.storage_kind {
                StorageKind::Indirect => self.spill(key, &entry.value).await?,
                StorageKind::Direct => {
                    self.set_raw(key, entry.value.clone()).await?;
                }
            }
        }

        debug!("Imported {} widget entries", entries.len());
        Ok(())
    }

    // Blob first so a sentinel never points at nothing
    async fn spill(&self, key: &str, serialized: &str) -> KvResult<()> {
        self.blobs.set(key, serialized).await?;
        self.primary.set(key, INDIRECT_SENTINEL)
    }

    fn notify_quota_exceeded(&self) {
        if !self.quota_warned.swap(true, Ordering::SeqCst) {
            // No receivers is fine
            let _ = self.events.send(StorageEvent::QuotaExceeded);
        }
    }
}
