//! Core types for telephony gateway operations

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque provider-assigned identifier for one leg of a call.
///
/// A single logical call produces at least two of these: the agent leg
/// (parent) created when the call is originated, and the prospect leg
/// (child) created when the provider bridges the agent to the prospect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallId(pub String);

impl CallId {
    pub fn new(id: impl Into<String>) -> Self {
        CallId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CallId {
    fn from(s: String) -> Self {
        CallId(s)
    }
}

impl From<&str> for CallId {
    fn from(s: &str) -> Self {
        CallId(s.to_string())
    }
}

/// Webhook URLs handed to the provider at call-creation time.
#[derive(Debug, Clone)]
pub struct CallbackUrls {
    /// TwiML/voice URL the provider fetches when the agent leg answers
    pub voice_url: String,
    /// Status callback URL for lifecycle events (answered, completed)
    pub status_callback: String,
}

impl CallbackUrls {
    /// Build the standard callback pair from the public base URL of the
    /// service, with the prospect number carried on the voice URL.
    pub fn for_prospect(public_base_url: &str, prospect_number: &str) -> Self {
        let base = public_base_url.trim_end_matches('/');
        let encoded: String = url::form_urlencoded::byte_serialize(prospect_number.as_bytes()).collect();
        CallbackUrls {
            voice_url: format!("{base}/connect_prospect?prospect_number={encoded}"),
            status_callback: format!("{base}/call_status"),
        }
    }
}

/// Call resource as returned by the provider's call lookup.
///
/// `duration` is a string on the wire and only present once the provider
/// has settled billing data for a completed call.
#[derive(Debug, Clone, Deserialize)]
pub struct CallResource {
    pub sid: String,
    #[serde(default)]
    pub parent_call_sid: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl CallResource {
    /// Parsed duration in seconds, if the provider has one.
    pub fn duration_seconds(&self) -> Option<u32> {
        self.duration.as_deref().and_then(|d| d.parse().ok())
    }
}
