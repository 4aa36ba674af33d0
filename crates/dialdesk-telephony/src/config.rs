//! Configuration for the telephony gateway client

use crate::error::{Result, TelephonyError};

/// Provider account configuration.
#[derive(Debug, Clone)]
pub struct TelephonyConfig {
    /// Provider account identifier
    pub account_sid: String,
    /// Provider auth token (basic-auth password)
    pub auth_token: String,
    /// Outbound caller-id number, E.164
    pub from_number: String,
    /// API base URL; overridable for tests
    pub api_base: String,
    /// Outbound request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for TelephonyConfig {
    fn default() -> Self {
        TelephonyConfig {
            account_sid: String::new(),
            auth_token: String::new(),
            from_number: String::new(),
            api_base: "https://api.twilio.com".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl TelephonyConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let account_sid = require_env("TWILIO_ACCOUNT_SID")?;
        let auth_token = require_env("TWILIO_AUTH_TOKEN")?;
        let from_number = require_env("TWILIO_PHONE_NUMBER")?;
        let api_base = std::env::var("TWILIO_API_BASE")
            .unwrap_or_else(|_| "https://api.twilio.com".to_string());

        Ok(TelephonyConfig {
            account_sid,
            auth_token,
            from_number,
            api_base,
            ..Default::default()
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| TelephonyError::Config(format!("{name} is not set")))
}
