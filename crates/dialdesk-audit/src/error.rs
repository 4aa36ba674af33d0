//! Error types for audit-log operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Store returned {status}: {message}")]
    Store { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AuditError>;
