use crate::{KeyValueStore, Result as DbErrorResult};

use desk_core::{TRACKER_STORAGE_KEY, TrackerState, migrate_tracker_state};

use log::info;
use serde_json::Value;

/// Reads the tracker state, normalizing it and writing the result back
/// when anything had to change. An absent or unreadable value yields the
/// default state, which is persisted too.
pub async fn load_tracker_state(kv: &KeyValueStore, now_ms: i64) -> DbErrorResult<TrackerState> {
    // Unparseable state is treated like no state
    let stored = kv
        .get_raw(TRACKER_STORAGE_KEY)
        .await?
        .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
        .unwrap_or(Value::Null);

    let migrated = migrate_tracker_state(&stored, now_ms);
    if migrated.changed {
        info!("Tracker state migrated to schema {}", migrated.state.schema_version);
        kv.set(TRACKER_STORAGE_KEY, &migrated.state).await?;
    }

    Ok(migrated.state)
}
