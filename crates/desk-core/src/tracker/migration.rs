//! Load-time normalization of stored tracker state.
//!
//! Older builds wrote partial objects and expressed served time as an
//! absolute `negExpiresAt` deadline. [`migrate_tracker_state`] turns any
//! stored value into a complete [`TrackerState`] once, reporting whether
//! anything had to change so the caller knows to write it back.

use crate::tracker::state::{ClassRoom, Student, TRACKER_SCHEMA_VERSION, TrackerState, TrackerUi};

use std::collections::BTreeMap;

use log::debug;
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Migrated {
    pub state: TrackerState,
    pub changed: bool,
}

pub fn migrate_tracker_state(value: &Value, now_ms: i64) -> Migrated {
    let Some(root) = value.as_object() else {
        return defaulted(now_ms);
    };
    let Some(classes) = root.get("classes").and_then(Value::as_object) else {
        return defaulted(now_ms);
    };

    let mut normalizer = Normalizer {
        now_ms,
        changed: false,
    };

    let stored_version = root.get("schemaVersion").and_then(Value::as_u64);
    if stored_version != Some(u64::from(TRACKER_SCHEMA_VERSION)) {
        debug!("Migrating tracker state from schema {stored_version:?}");
        normalizer.changed = true;
    }

    let ui = normalizer.ui(root.get("ui"));
    let classes = classes
        .iter()
        .map(|(id, class)| (id.clone(), normalizer.class(id, class, &ui)))
        .collect();

    Migrated {
        state: TrackerState {
            schema_version: TRACKER_SCHEMA_VERSION,
            classes,
            ui,
        },
        changed: normalizer.changed,
    }
}

fn defaulted(now_ms: i64) -> Migrated {
    Migrated {
        state: TrackerState::default_at(now_ms),
        changed: true,
    }
}

struct Normalizer {
    now_ms: i64,
    changed: bool,
}

impl Normalizer {
    fn ui(&mut self, value: Option<&Value>) -> TrackerUi {
        let defaults = TrackerUi::new(self.now_ms);
        let Some(ui) = value.and_then(Value::as_object) else {
            self.changed = true;
            return defaults;
        };

        TrackerUi {
            min_count_by_class: self.int_map(ui.get("minCountByClass")),
            min_positive_by_class: self.int_map(ui.get("minPositiveByClass")),
            timer_running: self.bool_or(ui.get("timerRunning"), defaults.timer_running),
            timer_frozen_at: self.int_or(ui.get("timerFrozenAt"), defaults.timer_frozen_at),
            neg_minutes_per_point: self
                .float_or(ui.get("negMinutesPerPoint"), defaults.neg_minutes_per_point),
            pos_minutes_per_point: self
                .float_or(ui.get("posMinutesPerPoint"), defaults.pos_minutes_per_point),
            last_tick_now: self.int_or(ui.get("lastTickNow"), defaults.last_tick_now),
        }
    }

    fn class(&mut self, id: &str, value: &Value, ui: &TrackerUi) -> ClassRoom {
        let empty = Map::new();
        let class = value.as_object().unwrap_or_else(|| {
            self.changed = true;
            &empty
        });

        let name = self.string_or(class.get("name"), id);
        let students = match class.get("students").and_then(Value::as_array) {
            Some(students) => students
                .iter()
                .filter_map(|s| self.student(s, ui))
                .collect(),
            None => {
                self.changed = true;
                Vec::new()
            }
        };

        ClassRoom { name, students }
    }

    fn student(&mut self, value: &Value, ui: &TrackerUi) -> Option<Student> {
        let Some(student) = value.as_object() else {
            self.changed = true;
            return None;
        };

        let id = match student.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                self.changed = true;
                Uuid::new_v4().to_string()
            }
        };
        let name = self.string_or(student.get("name"), "");
        let count = self.int_or(student.get("count"), 0);
        let positive_count = self.int_or(student.get("positiveCount"), 0);
        let marked = self.bool_or(student.get("marked"), false);

        let mut neg_spent_ms = self.int_or(student.get("negSpentMs"), 0);
        if neg_spent_ms < 0 {
            self.changed = true;
            neg_spent_ms = 0;
        }

        // Deadline model: served time = total penalty minus what was left
        if let Some(expires_at) = student.get("negExpiresAt") {
            self.changed = true;
            if let Some(expires_at) = expires_at.as_f64().filter(|_| count > 0) {
                let remaining = (expires_at as i64).saturating_sub(self.now_ms).max(0);
                let total = count.saturating_mul(ui.neg_ms_per_point()).max(0);
                neg_spent_ms = total.saturating_sub(remaining).max(0);
            }
        }

        Some(Student {
            id,
            name,
            marked,
            count,
            positive_count,
            neg_spent_ms,
        })
    }

    fn int_or(&mut self, value: Option<&Value>, default: i64) -> i64 {
        match value.and_then(Value::as_f64) {
            Some(n) => n as i64,
            None => {
                self.changed = true;
                default
            }
        }
    }

    fn float_or(&mut self, value: Option<&Value>, default: f64) -> f64 {
        match value.and_then(Value::as_f64) {
            Some(n) => n,
            None => {
                self.changed = true;
                default
            }
        }
    }

    fn bool_or(&mut self, value: Option<&Value>, default: bool) -> bool {
        match value.and_then(Value::as_bool) {
            Some(b) => b,
            None => {
                self.changed = true;
                default
            }
        }
    }

    fn string_or(&mut self, value: Option<&Value>, default: &str) -> String {
        match value.and_then(Value::as_str) {
            Some(s) => s.to_string(),
            None => {
                self.changed = true;
                default.to_string()
            }
        }
    }

    fn int_map(&mut self, value: Option<&Value>) -> BTreeMap<String, i64> {
        let Some(map) = value.and_then(Value::as_object) else {
            self.changed = true;
            return BTreeMap::new();
        };

        map.iter()
            .filter_map(|(k, v)| match v.as_f64() {
                Some(n) => Some((k.clone(), n as i64)),
                None => {
                    self.changed = true;
                    None
                }
            })
            .collect()
    }
}
