use crate::backup::archive::{LOCAL_WEB_META_ENTRY, MANIFEST_ENTRY, file_entry_name};
use crate::{
    ArchiveCodec, BackupData, BackupPayload, CoreError, EncodeOptions, LocalWebArchive,
    ProgressFn, Site, SiteFile, YieldFn,
};

use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::FutureExt;
use googletest::prelude::*;
use tokio_util::sync::CancellationToken;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

fn sample_records() -> LocalWebArchive {
    let first = Site::new("Mapa".to_string(), Some("Clase A".to_string()));
    let second = Site::new("Quiz".to_string(), None);

    let file = |site: &Site, path: &str, mime: &str, bytes: &[u8]| {
        SiteFile::new(site.id, path.to_string(), mime.to_string(), bytes.to_vec())
    };
    let files = vec![
        file(&first, "index.html", "text/html", b"<h1>mapa</h1>"),
        file(&first, "img/logo.png", "image/png", &[0x89, 0x50, 0x4e, 0x47, 0, 1, 2]),
        file(&second, "index.html", "text/html", b"<h1>quiz</h1>"),
    ];

    LocalWebArchive {
        sites: vec![first, second],
        files,
    }
}

fn raw_zip(entries: Vec<(&str, Vec<u8>)>) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in entries {
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(&bytes).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[tokio::test]
async fn given_payload_and_records_when_encoded_then_decode_restores_both() {
    // Given
    let codec = ArchiveCodec::default();
    let payload = BackupPayload::build(BackupData::default());
    let records = sample_records();

    // When
    let bytes = codec
        .encode(&payload, Some(&records), EncodeOptions::default())
        .await
        .unwrap();
    let decoded = codec.decode(&bytes).unwrap();

    // Then
    assert_that!(decoded.payload, eq(&payload));
    assert_that!(decoded.local_web, some(eq(&records)));
}

#[tokio::test]
async fn given_no_records_when_encoded_then_archive_has_only_manifest() {
    let codec = ArchiveCodec::default();
    let payload = BackupPayload::build(BackupData::default());

    let bytes = codec
        .encode(&payload, None, EncodeOptions::default())
        .await
        .unwrap();

    let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
    assert_that!(archive.len(), eq(1));
    assert_that!(codec.decode(&bytes).unwrap().local_web, none());
}

#[tokio::test]
async fn given_progress_and_yield_hooks_when_encoding_then_called_once_per_file() {
    let codec = ArchiveCodec::default();
    let payload = BackupPayload::build(BackupData::default());
    let records = sample_records();
    let progress_calls = AtomicUsize::new(0);
    let yields = AtomicUsize::new(0);
    let last_total = AtomicUsize::new(0);

    let on_progress: ProgressFn = &|done, total| {
        progress_calls.fetch_add(1, Ordering::SeqCst);
        assert!(done <= total);
        last_total.store(total, Ordering::SeqCst);
    };
    let yield_control: YieldFn = &|| {
        yields.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().boxed()
    };

    codec
        .encode(
            &payload,
            Some(&records),
            EncodeOptions {
                on_progress: Some(on_progress),
                yield_control: Some(yield_control),
                cancel: None,
            },
        )
        .await
        .unwrap();

    assert_that!(progress_calls.load(Ordering::SeqCst), eq(3));
    assert_that!(yields.load(Ordering::SeqCst), eq(3));
    assert_that!(last_total.load(Ordering::SeqCst), eq(3));
}

#[tokio::test]
async fn given_cancelled_token_when_encoding_then_aborted() {
    let codec = ArchiveCodec::default();
    let payload = BackupPayload::build(BackupData::default());
    let records = sample_records();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = codec
        .encode(
            &payload,
            Some(&records),
            EncodeOptions {
                cancel: Some(&cancel),
                ..EncodeOptions::default()
            },
        )
        .await;

    assert!(result.is_err_and(|e| e.is_aborted()));
}

#[test]
fn given_archive_without_manifest_when_decoding_then_missing_manifest() {
    let bytes = raw_zip(vec![("notes.txt", b"hello".to_vec())]);

    let result = ArchiveCodec::default().decode(&bytes);

    assert!(matches!(result, Err(CoreError::MissingManifest { .. })));
}

#[test]
fn given_manifest_with_bad_shape_when_decoding_then_invalid_payload() {
    let bytes = raw_zip(vec![(MANIFEST_ENTRY, br#"{"meta":{},"data":{}}"#.to_vec())]);

    let result = ArchiveCodec::default().decode(&bytes);

    assert!(matches!(result, Err(CoreError::InvalidPayload { .. })));
}

#[test]
fn given_metadata_without_bytes_when_decoding_then_file_is_dropped() {
    // Given: meta lists two files but only one byte entry exists
    let records = sample_records();
    let manifest = serde_json::to_vec(&BackupPayload::build(BackupData::default())).unwrap();
    let meta = serde_json::to_vec(&records.meta()).unwrap();
    let kept = &records.files[0];
    let entry = file_entry_name(&kept.key);

    let bytes = raw_zip(vec![
        (MANIFEST_ENTRY, manifest),
        (LOCAL_WEB_META_ENTRY, meta),
        (entry.as_str(), kept.bytes.clone()),
    ]);

    // When
    let decoded = ArchiveCodec::default().decode(&bytes).unwrap();

    // Then
    let local_web = decoded.local_web.unwrap();
    assert_that!(local_web.sites, len(eq(2)));
    assert_that!(local_web.files, len(eq(1)));
    assert_that!(local_web.files[0], eq(kept));
}

#[test]
fn given_garbage_when_decoding_then_malformed_archive() {
    let result = ArchiveCodec::default().decode(b"PK\x03\x04 definitely not a zip");

    assert!(matches!(result, Err(CoreError::MalformedArchive { .. })));
}

#[test]
fn given_out_of_range_level_when_creating_codec_then_validation_error() {
    assert!(ArchiveCodec::new(9).is_ok());
    assert!(matches!(
        ArchiveCodec::new(10),
        Err(CoreError::Validation { .. })
    ));
    assert!(ArchiveCodec::new(-1).is_err());
}
