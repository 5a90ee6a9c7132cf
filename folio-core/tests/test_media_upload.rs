#![cfg(feature = "test-utils")]
//! Integration tests for image uploads and media-reference normalization.

mod support;

use folio_core::model::{MediaKind, RecordField};
use folio_core::notify::NotificationLevel;
use support::{comic, drain, harness};

#[tokio::test]
async fn successful_upload_points_the_record_at_the_public_url() {
    let mut h = harness();
    h.store.seed(
        MediaKind::Comic,
        vec![comic("5", "Strip", "May 2024", "")],
    );
    h.session.load(MediaKind::Comic).await;

    let id = h.session.records(MediaKind::Comic)[0].id.clone();
    h.session.begin_edit(MediaKind::Comic, &id);
    let url = h
        .session
        .attach_media(MediaKind::Comic, &id, b"png bytes", "strip.png")
        .await
        .expect("upload should succeed");

    assert_eq!(h.session.records(MediaKind::Comic)[0].media_ref, url);

    let uploads = h.storage.uploads();
    assert_eq!(uploads.len(), 1);
    let (path, len) = &uploads[0];
    assert!(path.starts_with("comics/"));
    assert!(path.ends_with(".png"));
    assert_eq!(*len, b"png bytes".len());
}

#[tokio::test]
async fn failed_upload_leaves_the_media_reference_untouched() {
    let mut h = harness();
    h.store.seed(
        MediaKind::Comic,
        vec![comic("5", "Strip", "May 2024", "https://img/before.png")],
    );
    h.session.load(MediaKind::Comic).await;
    h.storage.set_failing(true);

    let id = h.session.records(MediaKind::Comic)[0].id.clone();
    let result = h
        .session
        .attach_media(MediaKind::Comic, &id, b"png bytes", "strip.png")
        .await;

    assert_eq!(result, None);
    assert_eq!(
        h.session.records(MediaKind::Comic)[0].media_ref,
        "https://img/before.png"
    );
    let notes = drain(&mut h.notifications);
    assert_eq!(notes.last().unwrap().level, NotificationLevel::Error);
}

#[tokio::test]
async fn pasted_youtube_url_is_normalized_to_a_bare_id() {
    let mut h = harness();
    let draft = h.session.begin_create(MediaKind::Video);
    h.session.update_field(
        MediaKind::Video,
        &draft,
        RecordField::Media,
        "https://youtu.be/dQw4w9WgXcQ",
    );
    assert_eq!(
        h.session.records(MediaKind::Video)[0].media_ref,
        "dQw4w9WgXcQ"
    );
}

#[tokio::test]
async fn comic_media_references_are_taken_verbatim() {
    let mut h = harness();
    let draft = h.session.begin_create(MediaKind::Comic);
    h.session.update_field(
        MediaKind::Comic,
        &draft,
        RecordField::Media,
        "https://youtu.be/not-normalized.png",
    );
    assert_eq!(
        h.session.records(MediaKind::Comic)[0].media_ref,
        "https://youtu.be/not-normalized.png"
    );
}
