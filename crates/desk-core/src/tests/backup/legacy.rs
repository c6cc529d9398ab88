use crate::CoreError;
use crate::backup::legacy::{LegacyStrategy, extract_legacy_state, extract_with};

use serde_json::{Value, json};

#[test]
fn test_state_field_wrapper_is_unwrapped() {
    let doc = json!({ "exportedAt": 1, "state": { "classes": {} } });

    let extraction = extract_legacy_state(&doc).unwrap();

    assert_eq!(extraction.strategy, "state-field");
    assert_eq!(extraction.state, json!({ "classes": {} }));
}

#[test]
fn test_bare_classes_document_is_taken_whole() {
    let doc = json!({ "classes": { "clase_01": { "name": "1A", "students": [] } }, "ui": {} });

    let extraction = extract_legacy_state(&doc).unwrap();

    assert_eq!(extraction.strategy, "classes-shape");
    assert_eq!(extraction.state, doc);
}

#[test]
fn test_state_field_wins_over_classes_shape() {
    let doc = json!({ "state": { "classes": {} }, "classes": { "x": {} } });

    let extraction = extract_legacy_state(&doc).unwrap();

    assert_eq!(extraction.strategy, "state-field");
}

#[test]
fn test_unknown_shape_is_unrecognized() {
    for doc in [json!({ "state": 3 }), json!({ "classes": [] }), json!("text")] {
        let result = extract_legacy_state(&doc);
        assert!(matches!(result, Err(CoreError::UnrecognizedFormat { .. })));
    }
}

struct NotesStrategy;

impl LegacyStrategy for NotesStrategy {
    fn name(&self) -> &'static str {
        "notes"
    }

    fn extract(&self, document: &Value) -> Option<Value> {
        document.get("notes").cloned()
    }
}

#[test]
fn test_custom_strategy_list_is_used_in_order() {
    let strategies: Vec<Box<dyn LegacyStrategy>> = vec![Box::new(NotesStrategy)];

    let extraction = extract_with(&strategies, &json!({ "notes": "hola" })).unwrap();

    assert_eq!(extraction.strategy, "notes");
    assert_eq!(extraction.state, json!("hola"));
}
