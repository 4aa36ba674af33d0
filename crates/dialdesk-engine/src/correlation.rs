//! Call correlation store
//!
//! Keyed mapping from a call id to the record it should update, written
//! once at dial time and read by every later asynchronous event. Backed by
//! the audit log's `call_mappings` collection: last-write-wins upsert, no
//! transactions, entries never deleted. Volume is low enough that stale
//! mappings are acceptable.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::debug;

use dialdesk_audit::{AuditLog, Result};
use dialdesk_records::RecordId;
use dialdesk_telephony::CallId;

pub(crate) const MAPPINGS_COLLECTION: &str = "call_mappings";

/// CallId -> RecordId lookup over the audit log.
#[derive(Clone)]
pub struct CorrelationStore {
    audit: Arc<dyn AuditLog>,
}

impl CorrelationStore {
    pub fn new(audit: Arc<dyn AuditLog>) -> Self {
        CorrelationStore { audit }
    }

    /// Unconditional upsert keyed by call id.
    pub async fn put(&self, call_id: &CallId, record_id: &RecordId) -> Result<()> {
        debug!(call_id = %call_id, record_id = %record_id, "storing call correlation");
        self.audit
            .set(
                MAPPINGS_COLLECTION,
                call_id.as_str(),
                json!({
                    "call_sid": call_id.as_str(),
                    "record_id": record_id.to_string(),
                    "created_at": Utc::now().to_rfc3339(),
                }),
            )
            .await
    }

    /// Point lookup. Absence is an expected outcome, not an error: the
    /// event may reference the wrong call leg, or the call never went
    /// through the dial flow.
    pub async fn get(&self, call_id: &CallId) -> Result<Option<RecordId>> {
        let doc = self.audit.get(MAPPINGS_COLLECTION, call_id.as_str()).await?;
        Ok(doc
            .as_ref()
            .and_then(|d| d.get("record_id"))
            .and_then(|v| v.as_str())
            .map(RecordId::new))
    }
}
