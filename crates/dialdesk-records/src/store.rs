//! Record store trait and item types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::Result;
use crate::fields::{CallActivityFields, TaskFields};

/// Identifier of one item in the record store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        RecordId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric form, required by relationship fields on the wire.
    pub fn as_u64(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId(s.to_string())
    }
}

/// A raw lead item as fetched from the store. Field access goes through
/// the extraction helpers in [`crate::fields`].
#[derive(Debug, Clone)]
pub struct LeadRecord {
    pub id: RecordId,
    pub raw: Value,
}

/// Narrow, domain-level interface over the record store.
///
/// The engine never sees app ids or field ids; those are resolved by the
/// implementation from its configuration.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create a call-activity item. Returns the new item's id.
    async fn create_call_activity(&self, fields: &CallActivityFields) -> Result<RecordId>;

    /// Patch the recording-URL field on an existing call-activity item.
    async fn update_recording_url(&self, record_id: &RecordId, recording_url: &str)
        -> Result<()>;

    /// Create a follow-up task item linked to a master lead.
    async fn create_task(&self, fields: &TaskFields) -> Result<RecordId>;

    /// Fetch a master-lead item.
    async fn get_lead(&self, record_id: &RecordId) -> Result<LeadRecord>;
}
