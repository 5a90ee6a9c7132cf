//! Object storage collaborator: image uploads and public URL derivation.

use crate::auth::SupabaseAuth;
use crate::config::SupabaseConfig;
use async_trait::async_trait;
use chrono::Utc;
use rand::{distr::Alphanumeric, Rng};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Upload rejected ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Trait for object storage (allows mocking for tests).
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` at `path` and return the publicly resolvable URL.
    async fn store(&self, path: &str, bytes: &[u8]) -> Result<String, StorageError>;
}

/// Derive a collision-resistant storage path for an uploaded image:
/// `comics/<unix-millis>-<random-suffix>.<ext>`.
pub fn upload_path(file_name: &str) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or(file_name);
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!(
        "comics/{}-{}.{}",
        Utc::now().timestamp_millis(),
        suffix.to_lowercase(),
        ext
    )
}

/// Production object storage over the Supabase Storage API.
pub struct SupabaseObjectStorage {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    bucket: String,
    auth: Option<Arc<SupabaseAuth>>,
}

impl SupabaseObjectStorage {
    pub fn new(config: &SupabaseConfig, auth: Option<Arc<SupabaseAuth>>) -> Self {
        SupabaseObjectStorage {
            http: reqwest::Client::new(),
            base_url: config.base_url().to_string(),
            anon_key: config.anon_key.clone(),
            bucket: config.bucket.clone(),
            auth,
        }
    }

    fn bearer(&self) -> String {
        self.auth
            .as_ref()
            .and_then(|a| a.access_token())
            .unwrap_or_else(|| self.anon_key.clone())
    }
}

#[async_trait]
impl ObjectStorage for SupabaseObjectStorage {
    async fn store(&self, path: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .header("cache-control", "max-age=3600")
            .header("x-upsert", "false")
            .body(bytes.to_vec())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let public_url = format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        );
        info!("Uploaded {} bytes to {path}", bytes.len());
        Ok(public_url)
    }
}
