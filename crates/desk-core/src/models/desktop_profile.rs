use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Saved desktop settings of one profile. Theme and window layout are
/// owned by the UI and carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesktopProfile {
    #[serde(default)]
    pub theme: Value,
    #[serde(default)]
    pub active_widgets: Vec<Value>,
    #[serde(default)]
    pub pinned_widgets: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Profile name to profile.
pub type ProfileCollection = BTreeMap<String, DesktopProfile>;
