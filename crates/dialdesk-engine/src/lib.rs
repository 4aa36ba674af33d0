//! # Dialdesk-Engine
//!
//! The call correlation and disposition join engine.
//!
//! A single logical call fans out into independent, asynchronously-arriving
//! events: status callbacks, a recording-ready callback, and the agent's
//! disposition submission. They reference different call legs and arrive in
//! no guaranteed order. This crate joins them back into exactly one
//! call-activity record:
//!
//! - [`CorrelationStore`]: call id -> lead/activity record id mapping,
//!   written at dial time, read by every later event
//! - [`CallFlowEngine::join_disposition`]: disposition submission ->
//!   call-activity record, with a guard for recordings that raced ahead
//! - [`CallFlowEngine::resolve_recording`]: recording webhook -> record
//!   update, with parent-leg fallback when the webhook carries the child
//!   leg's id
//!
//! Everything here is best-effort and single-attempt. The only failure that
//! propagates to a caller is a record-store write failure during the join;
//! every other dependency degrades gracefully.

pub mod correlation;
pub mod engine;
pub mod error;
pub mod rules;
pub mod types;

pub use correlation::CorrelationStore;
pub use engine::{CallFlowEngine, EngineConfig};
pub use error::{EngineError, Result};
pub use rules::{DispositionRules, TaskRule};
pub use types::{
    CallEvent, DispositionSubmission, JoinOutcome, RecordingEvent, ResolveOutcome,
};
