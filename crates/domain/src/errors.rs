//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Kintai
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum KintaiError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl KintaiError {
    /// Whether this error means the stored credential must be re-issued by
    /// the user rather than retried.
    pub fn needs_reauth(&self) -> bool {
        matches!(self, Self::Credential(_))
    }
}

/// Result type alias for Kintai operations
pub type Result<T> = std::result::Result<T, KintaiError>;
