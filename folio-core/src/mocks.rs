//! In-memory collaborator mocks with call counting and failure injection.
//!
//! Compiled for unit tests and, with the `test-utils` feature, for the
//! integration tests under `tests/`.

use crate::auth::{AuthError, IdentityProvider, Session};
use crate::model::{MediaKind, MediaRecord, RecordFields, RecordId};
use crate::session::ConfirmPrompt;
use crate::storage::{ObjectStorage, StorageError};
use crate::store::{RecordStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

fn injected_store_failure() -> StoreError {
    StoreError::Rejected {
        status: 503,
        body: "injected failure".to_string(),
    }
}

/// Record store backed by per-kind vectors held in display order
/// (newest first), the order `list` returns.
pub struct MockRecordStore {
    rows: Mutex<HashMap<MediaKind, Vec<MediaRecord>>>,
    next_id: AtomicU64,
    failing: AtomicBool,
    list_calls: AtomicUsize,
    insert_calls: AtomicUsize,
    update_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl MockRecordStore {
    pub fn new() -> Self {
        MockRecordStore {
            rows: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            failing: AtomicBool::new(false),
            list_calls: AtomicUsize::new(0),
            insert_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }

    /// Every subsequent call fails until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Id the next insert will assign.
    pub fn set_next_id(&self, id: u64) {
        self.next_id.store(id, Ordering::SeqCst);
    }

    /// Pre-populate a kind, newest first.
    pub fn seed(&self, kind: MediaKind, records: Vec<MediaRecord>) {
        self.rows.lock().unwrap().insert(kind, records);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(injected_store_failure())
        } else {
            Ok(())
        }
    }
}

impl Default for MockRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn list(&self, kind: MediaKind) -> Result<Vec<MediaRecord>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(&kind)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert(
        &self,
        kind: MediaKind,
        fields: &RecordFields,
    ) -> Result<MediaRecord, StoreError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = MediaRecord {
            id: RecordId::Persisted(id.to_string()),
            title: fields.title.clone(),
            date: fields.date.clone(),
            media_ref: fields.media_ref.clone(),
        };
        self.rows
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .insert(0, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        kind: MediaKind,
        id: &str,
        fields: &RecordFields,
    ) -> Result<(), StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let record = rows
            .get_mut(&kind)
            .and_then(|v| v.iter_mut().find(|r| r.id.persisted() == Some(id)))
            .ok_or(StoreError::Rejected {
                status: 404,
                body: format!("no {kind} row with id {id}"),
            })?;
        record.title = fields.title.clone();
        record.date = fields.date.clone();
        record.media_ref = fields.media_ref.clone();
        Ok(())
    }

    async fn delete(&self, kind: MediaKind, id: &str) -> Result<(), StoreError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let list = rows.entry(kind).or_default();
        let before = list.len();
        list.retain(|r| r.id.persisted() != Some(id));
        if list.len() == before {
            return Err(StoreError::Rejected {
                status: 404,
                body: format!("no {kind} row with id {id}"),
            });
        }
        Ok(())
    }
}

/// Object storage that remembers upload paths and sizes.
pub struct MockObjectStorage {
    uploads: Mutex<Vec<(String, usize)>>,
    failing: AtomicBool,
}

impl MockObjectStorage {
    pub fn new() -> Self {
        MockObjectStorage {
            uploads: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// `(path, byte length)` of every successful upload, in order.
    pub fn uploads(&self) -> Vec<(String, usize)> {
        self.uploads.lock().unwrap().clone()
    }
}

impl Default for MockObjectStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStorage for MockObjectStorage {
    async fn store(&self, path: &str, bytes: &[u8]) -> Result<String, StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected {
                status: 500,
                body: "injected failure".to_string(),
            });
        }
        self.uploads
            .lock()
            .unwrap()
            .push((path.to_string(), bytes.len()));
        Ok(format!("https://cdn.invalid/{path}"))
    }
}

/// Identity provider accepting exactly one credential pair.
pub struct MockIdentity {
    email: String,
    password: String,
    session: Mutex<Option<Session>>,
}

impl MockIdentity {
    pub fn new(email: &str, password: &str) -> Self {
        MockIdentity {
            email: email.to_string(),
            password: password.to_string(),
            session: Mutex::new(None),
        }
    }
}

#[async_trait]
impl IdentityProvider for MockIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        if email == self.email && password == self.password {
            let session = Session {
                access_token: "mock-token".to_string(),
                user_email: email.to_string(),
            };
            *self.session.lock().unwrap() = Some(session.clone());
            Ok(session)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    async fn current_session(&self) -> Option<Session> {
        self.session.lock().unwrap().clone()
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        *self.session.lock().unwrap() = None;
        Ok(())
    }
}

/// Confirmation prompt with a fixed answer and a call counter.
pub struct MockConfirm {
    answer: bool,
    prompts: AtomicUsize,
}

impl MockConfirm {
    pub fn accepting() -> Self {
        MockConfirm {
            answer: true,
            prompts: AtomicUsize::new(0),
        }
    }

    pub fn declining() -> Self {
        MockConfirm {
            answer: false,
            prompts: AtomicUsize::new(0),
        }
    }

    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

impl ConfirmPrompt for MockConfirm {
    fn confirm(&self, _message: &str) -> bool {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}
