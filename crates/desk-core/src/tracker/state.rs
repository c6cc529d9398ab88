use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const TRACKER_STORAGE_KEY: &str = "edunotas_asistencia_v1";
pub const TRACKER_SCHEMA_VERSION: u32 = 2;
pub const DEFAULT_CLASS_COUNT: usize = 12;
pub const DEFAULT_NEG_MINUTES_PER_POINT: f64 = 5.0;
pub const DEFAULT_POS_MINUTES_PER_POINT: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub marked: bool,
    /// Negative points
    pub count: i64,
    pub positive_count: i64,
    /// Time already served against the negative points
    pub neg_spent_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRoom {
    pub name: String,
    pub students: Vec<Student>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerUi {
    pub min_count_by_class: BTreeMap<String, i64>,
    pub min_positive_by_class: BTreeMap<String, i64>,
    pub timer_running: bool,
    pub timer_frozen_at: i64,
    pub neg_minutes_per_point: f64,
    pub pos_minutes_per_point: f64,
    pub last_tick_now: i64,
}

impl TrackerUi {
    pub fn new(now_ms: i64) -> Self {
        Self {
            min_count_by_class: BTreeMap::new(),
            min_positive_by_class: BTreeMap::new(),
            timer_running: false,
            timer_frozen_at: now_ms,
            neg_minutes_per_point: DEFAULT_NEG_MINUTES_PER_POINT,
            pos_minutes_per_point: DEFAULT_POS_MINUTES_PER_POINT,
            last_tick_now: now_ms,
        }
    }

    /// Whole minutes per negative point, in milliseconds.
    pub fn neg_ms_per_point(&self) -> i64 {
        minutes_to_ms(self.neg_minutes_per_point)
    }

    pub fn pos_ms_per_point(&self) -> i64 {
        minutes_to_ms(self.pos_minutes_per_point)
    }
}

fn minutes_to_ms(minutes: f64) -> i64 {
    if !minutes.is_finite() {
        return 0;
    }
    (minutes.floor().max(0.0) as i64).saturating_mul(60 * 1000)
}

/// State of the classroom-behavior tracker widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerState {
    pub schema_version: u32,
    pub classes: BTreeMap<String, ClassRoom>,
    pub ui: TrackerUi,
}

impl TrackerState {
    /// Twelve empty classes `clase_01`..`clase_12`.
    pub fn default_at(now_ms: i64) -> Self {
        let classes = (1..=DEFAULT_CLASS_COUNT)
            .map(|i| {
                (
                    format!("clase_{i:02}"),
                    ClassRoom {
                        name: format!("Clase {i}"),
                        students: Vec::new(),
                    },
                )
            })
            .collect();

        Self {
            schema_version: TRACKER_SCHEMA_VERSION,
            classes,
            ui: TrackerUi::new(now_ms),
        }
    }
}
