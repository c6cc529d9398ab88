use crate::{BACKUP_APP_NAME, BACKUP_VERSION, BackupData, BackupPayload, CoreError};

use googletest::prelude::*;
use serde_json::json;

#[test]
fn given_data_when_building_payload_then_meta_is_stamped() {
    let payload = BackupPayload::build(BackupData {
        active_profile_name: Some("Clase A".to_string()),
        ..BackupData::default()
    });

    assert_that!(payload.meta.app.as_str(), eq(BACKUP_APP_NAME));
    assert_that!(payload.meta.version, eq(BACKUP_VERSION));
    assert!(chrono::DateTime::parse_from_rfc3339(&payload.meta.created_at).is_ok());
}

#[test]
fn given_well_formed_candidate_when_validating_then_accepted() {
    let candidate = json!({
        "meta": { "app": "Escritorio Digital", "version": 1, "createdAt": "2024-01-01T00:00:00.000Z" },
        "data": {}
    });

    assert!(BackupPayload::validate(&candidate));
}

#[test]
fn given_malformed_candidates_when_validating_then_rejected() {
    let candidates = [
        json!(null),
        json!([]),
        json!({ "data": {} }),
        json!({ "meta": {}, "data": {} }),
        json!({ "meta": { "app": "x", "version": "1", "createdAt": "t" }, "data": {} }),
        json!({ "meta": { "app": "x", "version": 1, "createdAt": "t" }, "data": [] }),
        json!({ "meta": { "app": "x", "version": 1, "createdAt": "t" } }),
    ];

    for candidate in candidates {
        assert!(!BackupPayload::validate(&candidate), "{candidate}");
    }
}

#[test]
fn given_payload_with_unknown_version_when_checking_then_unsupported() {
    let payload = BackupPayload::from_value(json!({
        "meta": { "app": "Escritorio Digital", "version": 2, "createdAt": "t" },
        "data": {}
    }))
    .unwrap();

    let result = payload.ensure_supported_version();

    assert!(matches!(
        result,
        Err(CoreError::UnsupportedVersion { version: 2, .. })
    ));
}

#[test]
fn given_shape_mismatch_when_converting_then_invalid_payload() {
    let result = BackupPayload::from_value(json!({ "meta": "nope", "data": {} }));

    assert!(matches!(result, Err(CoreError::InvalidPayload { .. })));
}
