use std::path::PathBuf;

use crate::session::{FilesystemSessionStore, SESSION_FILE_NAME};

pub fn default_api_url() -> String {
    "http://localhost:5000".to_string()
}

pub fn default_timeout_secs() -> u64 {
    crate::api::DEFAULT_TIMEOUT_SECS
}

pub fn default_session_file() -> PathBuf {
    FilesystemSessionStore::default_path().unwrap_or_else(|| PathBuf::from(SESSION_FILE_NAME))
}

pub fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}
