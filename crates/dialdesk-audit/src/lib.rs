//! # Dialdesk-Audit
//!
//! Append/query document store used for the compliance audit trail and for
//! the transient call-identifier mappings that bridge asynchronous webhook
//! events back to CRM records.
//!
//! Two implementations are provided:
//! - [`HttpAuditLog`]: REST client for the hosted document store
//! - [`InMemoryAuditLog`]: process-local store for tests and single-node
//!   deployments
//!
//! Collections in use across the stack:
//! - `call_logs`: append-only call status events, later patched with
//!   recording metadata
//! - `call_mappings`: keyed call-id to record-id documents
//! - `disposition_logs`: one append per agent disposition submission

pub mod error;
pub mod http;
pub mod log;
pub mod memory;

pub use error::{AuditError, Result};
pub use http::{AuditConfig, HttpAuditLog};
pub use log::AuditLog;
pub use memory::InMemoryAuditLog;
