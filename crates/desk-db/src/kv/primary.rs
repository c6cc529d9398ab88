//! The small synchronous store every key is first written to.
//!
//! Both implementations may enforce a byte quota, counted as the sum of
//! key and value lengths over all entries. A write that would exceed it
//! fails with [`KvError::QuotaExceeded`] and leaves the store untouched.

use crate::kv::error::{KvError, KvResult};

use std::collections::BTreeMap;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use error_location::ErrorLocation;
use log::debug;

pub trait PrimaryStore: Send + Sync {
    fn get(&self, key: &str) -> KvResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> KvResult<()>;

    fn remove(&self, key: &str) -> KvResult<()>;

    fn keys(&self) -> KvResult<Vec<String>>;
}

fn used_bytes(entries: &BTreeMap<String, String>) -> usize {
    entries.iter().map(|(k, v)| k.len() + v.len()).sum()
}

#[track_caller]
fn check_quota(
    entries: &BTreeMap<String, String>,
    key: &str,
    value: &str,
    quota: Option<usize>,
) -> KvResult<()> {
    let Some(quota) = quota else {
        return Ok(());
    };

    let replaced = entries.get(key).map_or(0, |old| key.len() + old.len());
    let needed = used_bytes(entries) - replaced + key.len() + value.len();
    if needed > quota {
        return Err(KvError::QuotaExceeded {
            key: key.to_string(),
            needed,
            quota,
            location: ErrorLocation::from(Location::caller()),
        });
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct MemoryPrimaryStore {
    entries: RwLock<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryPrimaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: RwLock::default(),
            quota_bytes: Some(quota_bytes),
        }
    }
}

impl PrimaryStore for MemoryPrimaryStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        check_quota(&entries, key, value, self.quota_bytes)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> KvResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> KvResult<Vec<String>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.keys().cloned().collect())
    }
}

/// A JSON object on disk, cached in memory. Every mutation rewrites the
/// file through a sibling temp file and a rename.
#[derive(Debug)]
pub struct FilePrimaryStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl FilePrimaryStore {
    pub fn open(path: impl Into<PathBuf>, quota_bytes: Option<usize>) -> KvResult<Self> {
        let path = path.into();

        let entries = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)
                .map_err(|e| KvError::json(&path.display().to_string(), e))?
        } else {
            BTreeMap::new()
        };

        debug!(
            "Opened primary store {} ({} keys)",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path,
            entries: RwLock::new(entries),
            quota_bytes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> KvResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string(entries)
            .map_err(|e| KvError::json(&self.path.display().to_string(), e))?;
        let temp = self.path.with_extension("json.tmp");
        std::fs::write(&temp, contents)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

impl PrimaryStore for FilePrimaryStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        check_quota(&entries, key, value, self.quota_bytes)?;

        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> KvResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if !entries.contains_key(key) {
            return Ok(());
        }

        let mut next = entries.clone();
        next.remove(key);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn keys(&self) -> KvResult<Vec<String>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.keys().cloned().collect())
    }
}
