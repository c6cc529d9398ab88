use crate::{StorageKind, WidgetDataEntry};

#[test]
fn test_widget_entry_accepts_legacy_storage_names() {
    let entry: WidgetDataEntry =
        serde_json::from_str(r#"{"storage":"indexedDb","value":"[1,2]"}"#).unwrap();

    assert_eq!(entry.storage_kind, StorageKind::Indirect);
    assert_eq!(entry.value, "[1,2]");
}

#[test]
fn test_widget_entry_serializes_snake_case_kind() {
    let entry = WidgetDataEntry::direct("\"dark\"".to_string());

    let json = serde_json::to_value(&entry).unwrap();

    assert_eq!(json["storageKind"], "direct");
    assert_eq!(StorageKind::Direct.as_str(), "direct");
}
