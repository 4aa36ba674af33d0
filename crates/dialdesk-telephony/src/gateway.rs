//! Telephony gateway trait

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::types::{CallId, CallbackUrls};

/// Narrow interface over the telephony provider.
///
/// Every method is a network round trip. Callers decide per the
/// error-handling matrix whether a failure is fatal or absorbable; nothing
/// here retries.
#[async_trait]
pub trait TelephonyGateway: Send + Sync {
    /// Originate a call to `to` (a VOIP client id or an E.164 number) from
    /// the configured caller id, registering the given webhook URLs.
    /// Returns the parent-leg call id.
    async fn create_call(&self, to: &str, callbacks: &CallbackUrls) -> Result<CallId>;

    /// Fetch the settled duration of a call in seconds. `None` when the
    /// call is still in progress or the provider has no billing data yet;
    /// absence is an expected outcome, not an error.
    async fn call_duration(&self, call_id: &CallId) -> Result<Option<u32>>;

    /// Fetch the parent call id for a child leg. `None` when the call has
    /// no parent (it is itself a parent leg).
    async fn parent_call_id(&self, call_id: &CallId) -> Result<Option<CallId>>;

    /// Fetch recording audio with server-side credentials, for the
    /// playback proxy endpoint. Returns MP3 bytes.
    async fn fetch_recording(&self, recording_id: &str) -> Result<Bytes>;
}
