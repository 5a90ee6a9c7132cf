//! Content editing session: the state machine behind the admin surface.
//!
//! Tracks the in-memory record list per media kind, the single active
//! editing slot, and a pre-edit snapshot, and reconciles local edits against
//! the record store and object storage collaborators. Every remote failure
//! is caught here, logged, and surfaced as an error notification; the
//! session itself never becomes unusable.

use crate::model::{
    extract_youtube_id, MediaKind, MediaRecord, RecordField, RecordFields, RecordId,
};
use crate::notify::Notifier;
use crate::storage::{upload_path, ObjectStorage};
use crate::store::RecordStore;
use chrono::Local;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Trait for the delete-confirmation prompt (allows mocking for tests).
pub trait ConfirmPrompt: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// Per-kind editing state.
#[derive(Debug, Default)]
struct KindState {
    records: Vec<MediaRecord>,
    /// The record currently mid-edit, if any. One slot per kind.
    editing: Option<RecordId>,
    /// Copy of the edited record as it was when editing began, restored on
    /// cancel. For drafts this is the draft itself.
    snapshot: Option<MediaRecord>,
}

pub struct EditingSession {
    store: Arc<dyn RecordStore>,
    storage: Arc<dyn ObjectStorage>,
    confirm: Arc<dyn ConfirmPrompt>,
    notifier: Notifier,
    comics: KindState,
    videos: KindState,
    next_draft: u64,
}

/// Built-in placeholder content shown when the store is unreachable, so the
/// visitor-facing page is never empty.
fn fallback_records(kind: MediaKind) -> Vec<MediaRecord> {
    match kind {
        MediaKind::Comic => vec![
            MediaRecord {
                id: RecordId::Persisted("1".to_string()),
                title: "Space Adventures".to_string(),
                date: "September 2024".to_string(),
                media_ref: "https://via.placeholder.com/800x600/000000/FFFFFF?text=Space+Adventures"
                    .to_string(),
            },
            MediaRecord {
                id: RecordId::Persisted("2".to_string()),
                title: "Robot Friends".to_string(),
                date: "September 2024".to_string(),
                media_ref: "https://via.placeholder.com/800x600/222222/FFFFFF?text=Robot+Friends"
                    .to_string(),
            },
        ],
        MediaKind::Video => vec![
            MediaRecord {
                id: RecordId::Persisted("1".to_string()),
                title: "My Drawing Process".to_string(),
                date: "September 2024".to_string(),
                media_ref: "dQw4w9WgXcQ".to_string(),
            },
            MediaRecord {
                id: RecordId::Persisted("2".to_string()),
                title: "Dance Performance".to_string(),
                date: "August 2024".to_string(),
                media_ref: "dQw4w9WgXcQ".to_string(),
            },
        ],
    }
}

impl EditingSession {
    pub fn new(
        store: Arc<dyn RecordStore>,
        storage: Arc<dyn ObjectStorage>,
        confirm: Arc<dyn ConfirmPrompt>,
        notifier: Notifier,
    ) -> Self {
        EditingSession {
            store,
            storage,
            confirm,
            notifier,
            comics: KindState::default(),
            videos: KindState::default(),
            next_draft: 1,
        }
    }

    fn state(&self, kind: MediaKind) -> &KindState {
        match kind {
            MediaKind::Comic => &self.comics,
            MediaKind::Video => &self.videos,
        }
    }

    fn state_mut(&mut self, kind: MediaKind) -> &mut KindState {
        match kind {
            MediaKind::Comic => &mut self.comics,
            MediaKind::Video => &mut self.videos,
        }
    }

    /// The visible list for `kind`: newest first, drafts prepended.
    pub fn records(&self, kind: MediaKind) -> &[MediaRecord] {
        &self.state(kind).records
    }

    /// Id of the record currently being edited, if any.
    pub fn editing(&self, kind: MediaKind) -> Option<&RecordId> {
        self.state(kind).editing.as_ref()
    }

    /// Fetch all records of `kind` and replace the in-memory list.
    ///
    /// A store failure falls back to the built-in placeholder content; the
    /// caller sees a populated list either way.
    pub async fn load(&mut self, kind: MediaKind) {
        let records = match self.store.list(kind).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to load {kind}, using fallback content: {e}");
                fallback_records(kind)
            }
        };
        let state = self.state_mut(kind);
        state.records = records;
        state.editing = None;
        state.snapshot = None;
    }

    /// Create a new draft, prepend it, and open it for editing.
    pub fn begin_create(&mut self, kind: MediaKind) -> RecordId {
        let id = RecordId::Draft(self.next_draft);
        self.next_draft += 1;

        let draft = MediaRecord {
            id: id.clone(),
            title: kind.default_title().to_string(),
            date: Local::now().format("%B %Y").to_string(),
            media_ref: String::new(),
        };
        let state = self.state_mut(kind);
        state.records.insert(0, draft.clone());
        state.editing = Some(id.clone());
        state.snapshot = Some(draft);
        id
    }

    /// Open an existing record for editing. Unknown ids are ignored;
    /// switching from another active edit just moves the slot.
    pub fn begin_edit(&mut self, kind: MediaKind, id: &RecordId) {
        let state = self.state_mut(kind);
        let Some(record) = state.records.iter().find(|r| &r.id == id) else {
            return;
        };
        state.snapshot = Some(record.clone());
        state.editing = Some(id.clone());
    }

    /// Apply a field edit to the in-memory record (optimistic local echo).
    /// Media values on video records are normalized to bare YouTube ids.
    pub fn update_field(&mut self, kind: MediaKind, id: &RecordId, field: RecordField, value: &str) {
        let normalized;
        let value = if kind == MediaKind::Video && field == RecordField::Media {
            normalized = extract_youtube_id(value);
            normalized.as_str()
        } else {
            value
        };
        let state = self.state_mut(kind);
        if let Some(record) = state.records.iter_mut().find(|r| &r.id == id) {
            match field {
                RecordField::Title => record.title = value.to_string(),
                RecordField::Date => record.date = value.to_string(),
                RecordField::Media => record.media_ref = value.to_string(),
            }
        }
    }

    /// Persist the record being edited: insert for drafts, update otherwise.
    /// On failure the editing slot stays open and the operation can simply
    /// be invoked again.
    pub async fn commit(&mut self, kind: MediaKind, id: &RecordId) {
        let Some(record) = self
            .state(kind)
            .records
            .iter()
            .find(|r| &r.id == id)
            .cloned()
        else {
            warn!("Commit for unknown {kind} record {id}");
            return;
        };
        let fields = record.fields();

        match &record.id {
            RecordId::Draft(_) => match self.store.insert(kind, &fields).await {
                Ok(stored) => {
                    let state = self.state_mut(kind);
                    if let Some(entry) = state.records.iter_mut().find(|r| &r.id == id) {
                        *entry = stored;
                    }
                    state.editing = None;
                    state.snapshot = None;
                    info!("Inserted new {kind} record");
                    self.notifier
                        .success(format!("{} saved successfully!", kind.label()));
                }
                Err(e) => {
                    error!("Failed to insert {kind} record: {e}");
                    self.notifier.error(format!(
                        "Failed to save {}. Please try again.",
                        kind.label().to_lowercase()
                    ));
                }
            },
            RecordId::Persisted(store_id) => match self.store.update(kind, store_id, &fields).await
            {
                Ok(()) => {
                    let state = self.state_mut(kind);
                    state.editing = None;
                    state.snapshot = None;
                    info!("Updated {kind} record {store_id}");
                    self.notifier
                        .success(format!("{} saved successfully!", kind.label()));
                }
                Err(e) => {
                    error!("Failed to update {kind} record {store_id}: {e}");
                    self.notifier.error(format!(
                        "Failed to save {}. Please try again.",
                        kind.label().to_lowercase()
                    ));
                }
            },
        }
    }

    /// Abandon the current edit. A draft disappears entirely (it was never
    /// persisted); a persisted record is restored to its pre-edit snapshot.
    pub fn cancel(&mut self, kind: MediaKind, id: &RecordId) {
        let state = self.state_mut(kind);
        if id.is_draft() {
            state.records.retain(|r| &r.id != id);
        } else if let Some(snapshot) = state.snapshot.take() {
            if &snapshot.id == id {
                if let Some(entry) = state.records.iter_mut().find(|r| &r.id == id) {
                    *entry = snapshot;
                }
            }
        }
        state.editing = None;
        state.snapshot = None;
    }

    /// Delete a record after interactive confirmation. Drafts are removed
    /// locally; persisted records are deleted from the store first and kept
    /// in place if that fails.
    pub async fn remove(&mut self, kind: MediaKind, id: &RecordId) {
        let message = format!(
            "Are you sure you want to delete this {}?",
            kind.label().to_lowercase()
        );
        if !self.confirm.confirm(&message) {
            return;
        }

        if let RecordId::Persisted(store_id) = id {
            if let Err(e) = self.store.delete(kind, store_id).await {
                error!("Failed to delete {kind} record {store_id}: {e}");
                self.notifier.error(format!(
                    "Failed to delete {}. Please try again.",
                    kind.label().to_lowercase()
                ));
                return;
            }
        }

        let state = self.state_mut(kind);
        state.records.retain(|r| &r.id != id);
        if state.editing.as_ref() == Some(id) {
            state.editing = None;
            state.snapshot = None;
        }
        self.notifier
            .success(format!("{} deleted successfully!", kind.label()));
    }

    /// Upload an image and point the record's media reference at the
    /// resolved public URL. Returns the URL for preview on success; a failed
    /// upload leaves the previous media reference untouched.
    pub async fn attach_media(
        &mut self,
        kind: MediaKind,
        id: &RecordId,
        bytes: &[u8],
        file_name: &str,
    ) -> Option<String> {
        let path = upload_path(file_name);
        match self.storage.store(&path, bytes).await {
            Ok(url) => {
                self.update_field(kind, id, RecordField::Media, &url);
                Some(url)
            }
            Err(e) => {
                error!("Upload failed for {file_name}: {e}");
                self.notifier
                    .error("Failed to upload image. Please try again.");
                None
            }
        }
    }
}
