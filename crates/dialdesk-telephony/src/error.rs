//! Error types for telephony gateway operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelephonyError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Recording not found: {0}")]
    RecordingNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TelephonyError>;
