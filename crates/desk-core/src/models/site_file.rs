use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Separator between site id and path in a file's composite key.
pub const FILE_KEY_SEPARATOR: &str = "::";

/// File metadata as written to `localWeb/meta.json`; carries no bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteFileMeta {
    pub key: String,
    pub site_id: Uuid,
    pub path: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_name: Option<String>,
}

/// A stored file of a site, bytes included.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteFile {
    pub key: String,
    pub site_id: Uuid,
    pub path: String,
    pub mime_type: String,
    pub size: u64,
    pub profile_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl SiteFile {
    pub fn new(site_id: Uuid, path: String, mime_type: String, bytes: Vec<u8>) -> Self {
        Self {
            key: Self::composite_key(site_id, &path),
            site_id,
            path,
            mime_type,
            size: bytes.len() as u64,
            profile_name: None,
            bytes,
        }
    }

    pub fn composite_key(site_id: Uuid, path: &str) -> String {
        format!("{site_id}{FILE_KEY_SEPARATOR}{path}")
    }

    pub fn meta(&self) -> SiteFileMeta {
        SiteFileMeta {
            key: self.key.clone(),
            site_id: self.site_id,
            path: self.path.clone(),
            mime_type: self.mime_type.clone(),
            size: self.size,
            profile_name: self.profile_name.clone(),
        }
    }

    pub fn from_meta(meta: SiteFileMeta, bytes: Vec<u8>) -> Self {
        Self {
            key: meta.key,
            site_id: meta.site_id,
            path: meta.path,
            mime_type: meta.mime_type,
            size: meta.size,
            profile_name: meta.profile_name,
            bytes,
        }
    }

    /// Moves the file under another site, re-deriving the composite key.
    pub fn rekeyed(&self, site_id: Uuid) -> Self {
        Self {
            key: Self::composite_key(site_id, &self.path),
            site_id,
            ..self.clone()
        }
    }
}
