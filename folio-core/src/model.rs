//! Record types shared by the editing session and the store collaborators.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// The two media collections the site manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Comic,
    Video,
}

impl MediaKind {
    /// Store table name for this kind.
    pub fn table(&self) -> &'static str {
        match self {
            MediaKind::Comic => "comics",
            MediaKind::Video => "videos",
        }
    }

    /// Wire field name that carries the media reference for this kind.
    pub fn media_field(&self) -> &'static str {
        match self {
            MediaKind::Comic => "image_url",
            MediaKind::Video => "youtube_id",
        }
    }

    /// Human label, used in notifications ("Comic saved successfully!").
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Comic => "Comic",
            MediaKind::Video => "Video",
        }
    }

    /// Title given to a freshly created draft.
    pub fn default_title(&self) -> &'static str {
        match self {
            MediaKind::Comic => "New Comic Strip",
            MediaKind::Video => "New Video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// Record identifier.
///
/// Drafts exist only in local memory and carry a session-local counter;
/// persisted records carry the id the store assigned. Keeping the two as
/// enum variants means draft detection never relies on inspecting the id's
/// text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordId {
    Draft(u64),
    Persisted(String),
}

impl RecordId {
    pub fn is_draft(&self) -> bool {
        matches!(self, RecordId::Draft(_))
    }

    /// The store-assigned id, if this record was ever persisted.
    pub fn persisted(&self) -> Option<&str> {
        match self {
            RecordId::Draft(_) => None,
            RecordId::Persisted(id) => Some(id),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Draft(n) => write!(f, "draft:{n}"),
            RecordId::Persisted(id) => f.write_str(id),
        }
    }
}

/// A comic or video entry as held in memory.
///
/// `media_ref` is the public image URL for comics and the bare YouTube
/// identifier for videos. An empty media reference is a valid state (the
/// page renders a placeholder for it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: RecordId,
    pub title: String,
    pub date: String,
    pub media_ref: String,
}

impl MediaRecord {
    pub fn is_draft(&self) -> bool {
        self.id.is_draft()
    }

    pub fn fields(&self) -> RecordFields {
        RecordFields {
            title: self.title.clone(),
            date: self.date.clone(),
            media_ref: self.media_ref.clone(),
        }
    }
}

/// The client-owned fields sent on insert/update. Store-managed columns
/// (`id`, `created_at`) never travel in this direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFields {
    pub title: String,
    pub date: String,
    pub media_ref: String,
}

/// Editable fields of a record, for field-level updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Title,
    Date,
    Media,
}

fn youtube_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\s]+)")
            .expect("Failed to compile YouTube id pattern")
    })
}

/// Normalize a pasted YouTube URL (or bare identifier) to a bare identifier.
///
/// Accepts the watch, short, and embed URL forms. Anything that matches no
/// form is taken verbatim as the identifier.
pub fn extract_youtube_id(input: &str) -> String {
    match youtube_id_pattern().captures(input) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}
