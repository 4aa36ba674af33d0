//! Error types for record store operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordsError {
    /// Authentication with the store failed. The only error class that is
    /// fatal to a disposition submission.
    #[error("Record store authentication failed: {0}")]
    Auth(String),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Record store returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RecordsError {
    /// Whether this failure means the store rejected our credentials, as
    /// opposed to a transient or per-item problem.
    pub fn is_auth(&self) -> bool {
        matches!(self, RecordsError::Auth(_))
    }
}

pub type Result<T> = std::result::Result<T, RecordsError>;
