use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One imported "local web" bundle.
///
/// Sites without a `profile_name` are shared by every profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_name: Option<String>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,

    // Cached totals, maintained by whoever saves the site
    pub file_count: u64,
    pub total_bytes: u64,
}

/// Owner name as stored on records: an empty name means shared.
pub fn owner_name(profile_name: Option<String>) -> Option<String> {
    profile_name.filter(|name| !name.is_empty())
}

/// Current time at the millisecond precision sites are persisted with.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

impl Site {
    pub fn new(name: String, profile_name: Option<String>) -> Self {
        let now = now_millis();
        Self {
            id: Uuid::new_v4(),
            name,
            profile_name,
            created_at: now,
            updated_at: now,
            file_count: 0,
            total_bytes: 0,
        }
    }

    /// No owner, or an empty owner name.
    pub fn is_shared(&self) -> bool {
        self.profile_name.as_deref().is_none_or(str::is_empty)
    }
}
