//! Plain-JSON backups written before the manifest format existed.
//!
//! Two shapes are known: a wrapper holding the tracker state under `state`,
//! and the bare tracker state itself (recognised by its `classes` map).
//! Each shape is one [`LegacyStrategy`]; they are tried in order.

use crate::{CoreError, CoreResult};

use std::panic::Location;

use error_location::ErrorLocation;
use log::debug;
use serde_json::Value;

pub trait LegacyStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the restorable state when `document` has this strategy's shape.
    fn extract(&self, document: &Value) -> Option<Value>;
}

/// `{ "state": { ... } }`
#[derive(Debug, Default, Clone, Copy)]
pub struct StateFieldStrategy;

impl LegacyStrategy for StateFieldStrategy {
    fn name(&self) -> &'static str {
        "state-field"
    }

    fn extract(&self, document: &Value) -> Option<Value> {
        document
            .get("state")
            .filter(|state| state.is_object())
            .cloned()
    }
}

/// `{ "classes": { ... }, ... }` taken as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClassesShapeStrategy;

impl LegacyStrategy for ClassesShapeStrategy {
    fn name(&self) -> &'static str {
        "classes-shape"
    }

    fn extract(&self, document: &Value) -> Option<Value> {
        document
            .get("classes")
            .is_some_and(Value::is_object)
            .then(|| document.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyExtraction {
    pub strategy: &'static str,
    pub state: Value,
}

pub fn default_strategies() -> Vec<Box<dyn LegacyStrategy>> {
    vec![Box::new(StateFieldStrategy), Box::new(ClassesShapeStrategy)]
}

#[track_caller]
pub fn extract_with(
    strategies: &[Box<dyn LegacyStrategy>],
    document: &Value,
) -> CoreResult<LegacyExtraction> {
    for strategy in strategies {
        if let Some(state) = strategy.extract(document) {
            debug!("Legacy backup matched strategy {}", strategy.name());
            return Ok(LegacyExtraction {
                strategy: strategy.name(),
                state,
            });
        }
    }

    Err(CoreError::UnrecognizedFormat {
        location: ErrorLocation::from(Location::caller()),
    })
}

#[track_caller]
pub fn extract_legacy_state(document: &Value) -> CoreResult<LegacyExtraction> {
    extract_with(&default_strategies(), document)
}
