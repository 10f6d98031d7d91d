//! Error handling for cookiekit

use crate::record::ValidationError;
use thiserror::Error;

/// Main error type for cookiekit operations
#[derive(Error, Debug)]
pub enum CookieKitError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Cookie jar error: {0}")]
    Jar(String),

    /// The old record was removed but writing the edited one failed.
    #[error("Cookie '{name}' was removed but could not be recreated: {reason}")]
    RemovedButNotRecreated { name: String, reason: String },

    #[error("Cookie not found: {0}")]
    CookieNotFound(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

/// Result type alias for cookiekit operations
pub type Result<T> = std::result::Result<T, CookieKitError>;
