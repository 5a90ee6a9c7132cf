//! Record store collaborator: the `comics` and `videos` collections.

use crate::auth::SupabaseAuth;
use crate::config::SupabaseConfig;
use crate::model::{MediaKind, MediaRecord, RecordFields, RecordId};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Store rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("Malformed store response: {0}")]
    Malformed(String),
}

/// Trait for the row store (allows mocking for tests).
///
/// `id` parameters are store-assigned identifiers; drafts never reach
/// `update`/`delete` because their ids carry no persisted form.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records of `kind`, newest first (server-determined ordering).
    async fn list(&self, kind: MediaKind) -> Result<Vec<MediaRecord>, StoreError>;
    /// Insert a new row and return it with its store-assigned id.
    async fn insert(&self, kind: MediaKind, fields: &RecordFields)
        -> Result<MediaRecord, StoreError>;
    async fn update(
        &self,
        kind: MediaKind,
        id: &str,
        fields: &RecordFields,
    ) -> Result<(), StoreError>;
    async fn delete(&self, kind: MediaKind, id: &str) -> Result<(), StoreError>;
}

/// One row as PostgREST returns it. Either media column may be present
/// depending on the table; ids arrive as numbers (int8 primary keys).
#[derive(Debug, Deserialize)]
struct WireRow {
    id: serde_json::Value,
    title: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    youtube_id: Option<String>,
}

impl WireRow {
    fn into_record(self, kind: MediaKind) -> MediaRecord {
        let id = match &self.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let media_ref = match kind {
            MediaKind::Comic => self.image_url,
            MediaKind::Video => self.youtube_id,
        };
        MediaRecord {
            id: RecordId::Persisted(id),
            title: self.title,
            date: self.date,
            media_ref: media_ref.unwrap_or_default(),
        }
    }
}

fn wire_fields(kind: MediaKind, fields: &RecordFields) -> serde_json::Value {
    let mut row = serde_json::Map::new();
    row.insert("title".to_string(), fields.title.clone().into());
    row.insert("date".to_string(), fields.date.clone().into());
    row.insert(
        kind.media_field().to_string(),
        fields.media_ref.clone().into(),
    );
    serde_json::Value::Object(row)
}

/// Production record store over the Supabase PostgREST API.
pub struct SupabaseRecordStore {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    auth: Option<Arc<SupabaseAuth>>,
}

impl SupabaseRecordStore {
    pub fn new(config: &SupabaseConfig, auth: Option<Arc<SupabaseAuth>>) -> Self {
        SupabaseRecordStore {
            http: reqwest::Client::new(),
            base_url: config.base_url().to_string(),
            anon_key: config.anon_key.clone(),
            auth,
        }
    }

    fn table_url(&self, kind: MediaKind) -> String {
        format!("{}/rest/v1/{}", self.base_url, kind.table())
    }

    /// Bearer token: the owner's access token when signed in, otherwise the
    /// anon key (read-only access under row-level security).
    fn bearer(&self) -> String {
        self.auth
            .as_ref()
            .and_then(|a| a.access_token())
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn request(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(StoreError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl RecordStore for SupabaseRecordStore {
    async fn list(&self, kind: MediaKind) -> Result<Vec<MediaRecord>, StoreError> {
        let url = format!("{}?select=*&order=created_at.desc", self.table_url(kind));
        let resp = self.request(self.http.get(&url)).send().await?;
        let rows: Vec<WireRow> = Self::check(resp).await?.json().await?;
        debug!("Listed {} {} rows", rows.len(), kind);
        Ok(rows.into_iter().map(|r| r.into_record(kind)).collect())
    }

    async fn insert(
        &self,
        kind: MediaKind,
        fields: &RecordFields,
    ) -> Result<MediaRecord, StoreError> {
        let resp = self
            .request(self.http.post(self.table_url(kind)))
            .header("Prefer", "return=representation")
            .json(&wire_fields(kind, fields))
            .send()
            .await?;
        let mut rows: Vec<WireRow> = Self::check(resp).await?.json().await?;
        if rows.is_empty() {
            return Err(StoreError::Malformed(
                "insert returned no representation".to_string(),
            ));
        }
        Ok(rows.remove(0).into_record(kind))
    }

    async fn update(
        &self,
        kind: MediaKind,
        id: &str,
        fields: &RecordFields,
    ) -> Result<(), StoreError> {
        let url = format!(
            "{}?id=eq.{}",
            self.table_url(kind),
            urlencoding::encode(id)
        );
        let resp = self
            .request(self.http.patch(&url))
            .json(&wire_fields(kind, fields))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn delete(&self, kind: MediaKind, id: &str) -> Result<(), StoreError> {
        let url = format!(
            "{}?id=eq.{}",
            self.table_url(kind),
            urlencoding::encode(id)
        );
        let resp = self.request(self.http.delete(&url)).send().await?;
        Self::check(resp).await?;
        Ok(())
    }
}
