use crate::{Site, SiteFile, SiteFileMeta};

use serde::{Deserialize, Serialize};

/// Sites and their file records, bytes included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalWebArchive {
    pub sites: Vec<Site>,
    pub files: Vec<SiteFile>,
}

impl LocalWebArchive {
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    pub fn meta(&self) -> LocalWebMeta {
        LocalWebMeta {
            sites: self.sites.clone(),
            files: self.files.iter().map(SiteFile::meta).collect(),
        }
    }
}

/// Contents of `localWeb/meta.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalWebMeta {
    #[serde(default)]
    pub sites: Vec<Site>,
    #[serde(default)]
    pub files: Vec<SiteFileMeta>,
}

/// Local web section embedded in a plain-JSON backup. File bytes, when
/// present, travel base64-encoded next to the metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalWebBackup {
    #[serde(default)]
    pub sites: Vec<Site>,
    #[serde(default)]
    pub files: Vec<LocalWebFileEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalWebFileEntry {
    #[serde(flatten)]
    pub meta: SiteFileMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_base64: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalWebStats {
    pub site_count: u64,
    pub total_bytes: u64,
}
