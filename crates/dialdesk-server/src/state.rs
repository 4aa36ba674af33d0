//! Shared application state

use std::sync::Arc;

use dialdesk_engine::CallFlowEngine;
use dialdesk_records::{IntelligenceFieldIds, RecordStore};
use dialdesk_telephony::TelephonyGateway;

/// Everything the route handlers need. Cheap to clone; all collaborators
/// are shared behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<CallFlowEngine>,
    pub gateway: Arc<dyn TelephonyGateway>,
    pub records: Arc<dyn RecordStore>,
    pub intelligence_fields: Arc<IntelligenceFieldIds>,
    pub public_base_url: String,
}
