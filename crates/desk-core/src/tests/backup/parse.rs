use crate::{
    ArchiveCodec, BackupData, BackupPayload, CoreError, EncodeOptions, LocalWebArchive,
    ParsedBackup, Site, SiteFile, embed_local_web, parse_backup,
};

use googletest::prelude::*;
use serde_json::json;

fn records() -> LocalWebArchive {
    let site = Site::new("Mapa".to_string(), Some("Clase A".to_string()));
    let file = SiteFile::new(
        site.id,
        "index.html".to_string(),
        "text/html".to_string(),
        b"<p>hola</p>".to_vec(),
    );
    LocalWebArchive {
        sites: vec![site],
        files: vec![file],
    }
}

#[tokio::test]
async fn given_zip_bytes_when_parsing_then_archive_variant() {
    let codec = ArchiveCodec::default();
    let payload = BackupPayload::build(BackupData::default());
    let bytes = codec
        .encode(&payload, Some(&records()), EncodeOptions::default())
        .await
        .unwrap();

    let parsed = parse_backup(&codec, &bytes).unwrap();

    assert_that!(parsed.kind(), eq("archive"));
    let ParsedBackup::Archive { local_web, .. } = parsed else {
        panic!("expected archive");
    };
    assert_that!(local_web.unwrap().files, len(eq(1)));
}

#[test]
fn given_json_backup_with_inline_files_when_parsing_then_files_are_decoded() {
    // Given
    let archive = records();
    let payload = BackupPayload::build(BackupData {
        local_web: Some(embed_local_web(&archive)),
        ..BackupData::default()
    });
    let bytes = serde_json::to_vec(&payload).unwrap();

    // When
    let parsed = parse_backup(&ArchiveCodec::default(), &bytes).unwrap();

    // Then
    let ParsedBackup::Json { payload, local_web } = parsed else {
        panic!("expected json backup");
    };
    assert_that!(payload.data.local_web, none());
    assert_that!(local_web, some(eq(&archive)));
}

#[test]
fn given_json_file_entry_without_data_when_parsing_then_entry_is_skipped() {
    let archive = records();
    let mut embedded = embed_local_web(&archive);
    embedded.files[0].data_base64 = None;
    let payload = BackupPayload::build(BackupData {
        local_web: Some(embedded),
        ..BackupData::default()
    });
    let bytes = serde_json::to_vec(&payload).unwrap();

    let parsed = parse_backup(&ArchiveCodec::default(), &bytes).unwrap();

    let ParsedBackup::Json { local_web, .. } = parsed else {
        panic!("expected json backup");
    };
    let local_web = local_web.unwrap();
    assert_that!(local_web.sites, len(eq(1)));
    assert_that!(local_web.files, is_empty());
}

#[test]
fn given_newer_json_version_when_parsing_then_unsupported() {
    let bytes = serde_json::to_vec(&json!({
        "meta": { "app": "Escritorio Digital", "version": 7, "createdAt": "2024-05-01T10:00:00.000Z" },
        "data": {}
    }))
    .unwrap();

    let result = parse_backup(&ArchiveCodec::default(), &bytes);

    assert!(matches!(
        result,
        Err(CoreError::UnsupportedVersion { version: 7, .. })
    ));
}

#[test]
fn given_legacy_document_when_parsing_then_legacy_variant() {
    let bytes = br#"{"classes":{"clase_01":{"name":"1A","students":[]}}}"#;

    let parsed = parse_backup(&ArchiveCodec::default(), bytes).unwrap();

    assert_that!(parsed.kind(), eq("legacy"));
}

#[test]
fn given_unrelated_input_when_parsing_then_unrecognized() {
    for bytes in [b"not json at all".as_slice(), br#"{"hello":"world"}"#.as_slice()] {
        let result = parse_backup(&ArchiveCodec::default(), bytes);
        assert!(matches!(result, Err(CoreError::UnrecognizedFormat { .. })));
    }
}
