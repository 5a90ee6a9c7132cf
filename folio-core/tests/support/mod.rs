#![allow(dead_code)]
//! Shared harness for editing-session integration tests.

use folio_core::mocks::{MockConfirm, MockObjectStorage, MockRecordStore};
use folio_core::model::{MediaRecord, RecordId};
use folio_core::notify::{Notification, Notifier};
use folio_core::session::EditingSession;
use std::sync::Arc;
use tokio::sync::broadcast;

pub fn tracing_init() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_target(false)
        .try_init();
}

pub struct Harness {
    pub store: Arc<MockRecordStore>,
    pub storage: Arc<MockObjectStorage>,
    pub confirm: Arc<MockConfirm>,
    pub notifications: broadcast::Receiver<Notification>,
    pub session: EditingSession,
}

pub fn harness() -> Harness {
    harness_with_confirm(MockConfirm::accepting())
}

pub fn harness_with_confirm(confirm: MockConfirm) -> Harness {
    tracing_init();
    let store = Arc::new(MockRecordStore::new());
    let storage = Arc::new(MockObjectStorage::new());
    let confirm = Arc::new(confirm);
    let notifier = Notifier::new();
    let notifications = notifier.subscribe();
    let session = EditingSession::new(
        store.clone(),
        storage.clone(),
        confirm.clone(),
        notifier,
    );
    Harness {
        store,
        storage,
        confirm,
        notifications,
        session,
    }
}

/// Collect every notification emitted so far.
pub fn drain(rx: &mut broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(n) = rx.try_recv() {
        out.push(n);
    }
    out
}

pub fn comic(id: &str, title: &str, date: &str, image_url: &str) -> MediaRecord {
    MediaRecord {
        id: RecordId::Persisted(id.to_string()),
        title: title.to_string(),
        date: date.to_string(),
        media_ref: image_url.to_string(),
    }
}
