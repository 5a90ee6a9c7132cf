//! Configuration and the locally persisted admin hint.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Supabase project configuration (endpoint, anon key, storage bucket).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    /// Project base URL, e.g. `https://abc123.supabase.co`.
    pub url: String,
    /// Anonymous API key sent with every request.
    pub anon_key: String,
    /// Storage bucket holding uploaded comic images.
    pub bucket: String,
}

impl SupabaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::Config("Supabase URL cannot be empty".to_string()));
        }
        if self.anon_key.trim().is_empty() {
            return Err(ConfigError::Config("Supabase anon key cannot be empty".to_string()));
        }
        if self.bucket.trim().is_empty() {
            return Err(ConfigError::Config("Storage bucket cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Base URL with any trailing slash stripped, for joining API paths.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

const ADMIN_HINT_FILE: &str = "admin_hint";

/// Default directory for the admin hint marker.
pub fn default_hint_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("folio"))
}

/// Whether the admin hint marker is present.
///
/// This is a cosmetic flag only (show the admin chrome before the session
/// check completes); the identity collaborator's remembered session is the
/// authority and the flag is re-derived from it at startup.
pub fn read_admin_hint(dir: &Path) -> bool {
    dir.join(ADMIN_HINT_FILE).exists()
}

/// Persist or remove the admin hint marker.
pub fn write_admin_hint(dir: &Path, admin: bool) -> Result<(), ConfigError> {
    let path = dir.join(ADMIN_HINT_FILE);
    if admin {
        std::fs::create_dir_all(dir)?;
        std::fs::write(&path, b"1")?;
    } else if path.exists() {
        std::fs::remove_file(&path)?;
    }
    Ok(())
}

/// Best-effort variant used on logout paths where hint failures are not
/// worth surfacing.
pub fn write_admin_hint_best_effort(dir: &Path, admin: bool) {
    if let Err(e) = write_admin_hint(dir, admin) {
        warn!("Failed to update admin hint: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SupabaseConfig {
        SupabaseConfig {
            url: "https://abc123.supabase.co".to_string(),
            anon_key: "anon".to_string(),
            bucket: "images".to_string(),
        }
    }

    #[test]
    fn accepts_complete_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn rejects_blank_url() {
        let mut c = config();
        c.url = "  ".to_string();
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_blank_anon_key() {
        let mut c = config();
        c.anon_key = String::new();
        assert!(c.validate().is_err());
    }

    #[test]
    fn strips_trailing_slash_from_base_url() {
        let mut c = config();
        c.url = "https://abc123.supabase.co/".to_string();
        assert_eq!(c.base_url(), "https://abc123.supabase.co");
    }

    #[test]
    fn hint_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!read_admin_hint(dir.path()));
        write_admin_hint(dir.path(), true).unwrap();
        assert!(read_admin_hint(dir.path()));
        write_admin_hint(dir.path(), false).unwrap();
        assert!(!read_admin_hint(dir.path()));
    }

    #[test]
    fn clearing_absent_hint_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        assert!(write_admin_hint(dir.path(), false).is_ok());
    }
}
