use serde::{Deserialize, Serialize};

/// Where a widget value lived when it was exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// Literal serialized value held by the primary store.
    #[serde(alias = "localStorage")]
    Direct,
    /// Value relocated to the blob store.
    #[serde(alias = "indexedDb")]
    Indirect,
}

impl StorageKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Direct => "direct",
            Self::Indirect => "indirect",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDataEntry {
    #[serde(alias = "storage")]
    pub storage_kind: StorageKind,
    pub value: String,
}

impl WidgetDataEntry {
    pub fn direct(value: String) -> Self {
        Self {
            storage_kind: StorageKind::Direct,
            value,
        }
    }

    pub fn indirect(value: String) -> Self {
        Self {
            storage_kind: StorageKind::Indirect,
            value,
        }
    }
}
