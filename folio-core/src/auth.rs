//! Identity collaborator: password sign-in, remembered session, sign-out.

use crate::config::SupabaseConfig;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Mutex;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Auth request rejected ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// An authenticated owner session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub user_email: String,
}

/// Trait for the identity provider (allows mocking for tests).
///
/// The remembered session returned by `current_session` is the authority on
/// whether the owner is signed in; UI-side flags are hints derived from it.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;
    async fn current_session(&self) -> Option<Session>;
    async fn sign_out(&self) -> Result<(), AuthError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    email: String,
}

/// Production identity provider over the Supabase GoTrue API.
///
/// The session lives in process memory for the lifetime of the run; there is
/// no token refresh (owner sessions are short interactive ones).
pub struct SupabaseAuth {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: Mutex<Option<Session>>,
}

impl SupabaseAuth {
    pub fn new(config: &SupabaseConfig) -> Self {
        SupabaseAuth {
            http: reqwest::Client::new(),
            base_url: config.base_url().to_string(),
            anon_key: config.anon_key.clone(),
            session: Mutex::new(None),
        }
    }

    /// Access token of the remembered session, for authenticated store and
    /// storage requests.
    pub fn access_token(&self) -> Option<String> {
        self.session
            .lock()
            .unwrap()
            .as_ref()
            .map(|s| s.access_token.clone())
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            // GoTrue answers the password grant with 400 on bad credentials.
            if status.as_u16() == 400 || status.as_u16() == 401 {
                warn!("Sign-in rejected for {email}");
                return Err(AuthError::InvalidCredentials);
            }
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = resp.json().await?;
        let session = Session {
            access_token: token.access_token,
            user_email: token.user.email,
        };
        *self.session.lock().unwrap() = Some(session.clone());
        info!("Signed in as {}", session.user_email);
        Ok(session)
    }

    async fn current_session(&self) -> Option<Session> {
        self.session.lock().unwrap().clone()
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let token = self.session.lock().unwrap().take();
        let Some(session) = token else {
            return Ok(());
        };

        let url = format!("{}/auth/v1/logout", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        // The local session is already gone; a revocation failure only means
        // the token outlives us server-side.
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::Rejected { status, body });
        }
        info!("Signed out");
        Ok(())
    }
}
