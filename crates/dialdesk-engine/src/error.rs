//! Engine error types
//!
//! Deliberately narrow. Most dependency failures inside the engine are
//! absorbed and logged rather than propagated; the variants here are the
//! ones a caller can actually act on.

use thiserror::Error;

/// Errors surfaced by the join flow.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The record store rejected the primary activity write. Nothing was
    /// created; the caller should surface this to the agent.
    #[error("record store error: {0}")]
    RecordStore(#[from] dialdesk_records::RecordsError),

    /// The submission itself is unusable (e.g. a non-numeric lead record
    /// id), before any external call was made.
    #[error("invalid submission: {0}")]
    InvalidSubmission(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
