use crate::{Site, SiteFile};

use uuid::Uuid;

#[test]
fn test_site_file_new_derives_key_and_size() {
    let site_id = Uuid::new_v4();
    let file = SiteFile::new(
        site_id,
        "index.html".to_string(),
        "text/html".to_string(),
        b"<html></html>".to_vec(),
    );

    assert_eq!(file.key, format!("{site_id}::index.html"));
    assert_eq!(file.size, 13);
    assert_eq!(file.profile_name, None);
}

#[test]
fn test_site_file_rekeyed_moves_to_new_site() {
    let original = SiteFile::new(
        Uuid::new_v4(),
        "css/app.css".to_string(),
        "text/css".to_string(),
        b"body{}".to_vec(),
    );
    let target = Uuid::new_v4();

    let moved = original.rekeyed(target);

    assert_eq!(moved.site_id, target);
    assert_eq!(moved.key, format!("{target}::css/app.css"));
    assert_eq!(moved.bytes, original.bytes);
}

#[test]
fn test_site_file_meta_serializes_type_field() {
    let file = SiteFile::new(
        Uuid::new_v4(),
        "a.js".to_string(),
        "text/javascript".to_string(),
        vec![1, 2, 3],
    );

    let json = serde_json::to_value(file.meta()).unwrap();

    assert_eq!(json["type"], "text/javascript");
    assert_eq!(json["size"], 3);
    assert!(json.get("profileName").is_none());
}

#[test]
fn test_site_new_is_shared_without_profile() {
    let shared = Site::new("Mapa".to_string(), None);
    let owned = Site::new("Mapa".to_string(), Some("Clase A".to_string()));

    assert!(shared.is_shared());
    assert!(!owned.is_shared());
    assert_eq!(shared.created_at, shared.updated_at);
}

#[test]
fn test_site_timestamps_survive_json() {
    let site = Site::new("Quiz".to_string(), Some("Clase A".to_string()));

    let json = serde_json::to_string(&site).unwrap();
    let back: Site = serde_json::from_str(&json).unwrap();

    assert_eq!(back, site);
}
