//! Provider REST client
//!
//! Speaks the provider's 2010-04-01 REST shape: form-encoded call creation,
//! JSON call resources, basic auth on every request. Recording audio is
//! fetched as `.mp3` with the same credentials so end users never see them.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::TelephonyConfig;
use crate::error::{Result, TelephonyError};
use crate::gateway::TelephonyGateway;
use crate::types::{CallId, CallResource, CallbackUrls};

/// HTTP client for the hosted telephony provider.
#[derive(Clone)]
pub struct TwilioGateway {
    http: reqwest::Client,
    config: TelephonyConfig,
}

impl TwilioGateway {
    pub fn new(config: TelephonyConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(TwilioGateway { http, config })
    }

    fn account_url(&self, tail: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid,
            tail
        )
    }

    async fn fetch_call(&self, call_id: &CallId) -> Result<CallResource> {
        let url = self.account_url(&format!("Calls/{}.json", call_id));
        let response = self
            .http
            .get(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(TelephonyError::Provider { status, message });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl TelephonyGateway for TwilioGateway {
    async fn create_call(&self, to: &str, callbacks: &CallbackUrls) -> Result<CallId> {
        let url = self.account_url("Calls.json");
        let params = [
            ("To", to),
            ("From", self.config.from_number.as_str()),
            ("Url", callbacks.voice_url.as_str()),
            ("Method", "POST"),
            ("StatusCallback", callbacks.status_callback.as_str()),
            ("StatusCallbackEvent", "answered completed"),
            ("StatusCallbackMethod", "POST"),
        ];

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            warn!(status, "call creation rejected by provider");
            return Err(TelephonyError::Provider { status, message });
        }

        let resource: CallResource = response.json().await?;
        debug!(call_sid = %resource.sid, %to, "call originated");
        Ok(CallId::new(resource.sid))
    }

    async fn call_duration(&self, call_id: &CallId) -> Result<Option<u32>> {
        let resource = self.fetch_call(call_id).await?;
        Ok(resource.duration_seconds())
    }

    async fn parent_call_id(&self, call_id: &CallId) -> Result<Option<CallId>> {
        let resource = self.fetch_call(call_id).await?;
        Ok(resource.parent_call_sid.map(CallId::new))
    }

    async fn fetch_recording(&self, recording_id: &str) -> Result<Bytes> {
        let url = self.account_url(&format!("Recordings/{recording_id}.mp3"));
        let response = self
            .http
            .get(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                Err(TelephonyError::RecordingNotFound(recording_id.to_string()))
            }
            status if !status.is_success() => {
                let message = response.text().await.unwrap_or_default();
                Err(TelephonyError::Provider {
                    status: status.as_u16(),
                    message,
                })
            }
            _ => Ok(response.bytes().await?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(api_base: String) -> TelephonyConfig {
        TelephonyConfig {
            account_sid: "AC-test".to_string(),
            auth_token: "secret".to_string(),
            from_number: "+17205550100".to_string(),
            api_base,
            request_timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn create_call_posts_form_and_returns_sid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC-test/Calls.json"))
            .and(body_string_contains("StatusCallbackEvent"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "sid": "CA100",
                "parent_call_sid": null,
                "duration": null,
                "status": "queued"
            })))
            .mount(&server)
            .await;

        let gateway = TwilioGateway::new(test_config(server.uri())).unwrap();
        let callbacks = CallbackUrls::for_prospect("https://glue.example.com", "+13035551234");
        let call_id = gateway
            .create_call("client:agent_1", &callbacks)
            .await
            .unwrap();
        assert_eq!(call_id.as_str(), "CA100");
    }

    #[tokio::test]
    async fn call_duration_none_while_in_progress() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2010-04-01/Accounts/AC-test/Calls/CA100.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sid": "CA100",
                "duration": null,
                "status": "in-progress"
            })))
            .mount(&server)
            .await;

        let gateway = TwilioGateway::new(test_config(server.uri())).unwrap();
        let duration = gateway.call_duration(&CallId::new("CA100")).await.unwrap();
        assert_eq!(duration, None);
    }

    #[tokio::test]
    async fn parent_call_id_resolves_child_leg() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2010-04-01/Accounts/AC-test/Calls/CA200-child.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sid": "CA200-child",
                "parent_call_sid": "CA200-parent",
                "duration": "38"
            })))
            .mount(&server)
            .await;

        let gateway = TwilioGateway::new(test_config(server.uri())).unwrap();
        let parent = gateway
            .parent_call_id(&CallId::new("CA200-child"))
            .await
            .unwrap();
        assert_eq!(parent, Some(CallId::new("CA200-parent")));
    }

    #[tokio::test]
    async fn provider_error_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2010-04-01/Accounts/AC-test/Calls/CA404.json"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such call"))
            .mount(&server)
            .await;

        let gateway = TwilioGateway::new(test_config(server.uri())).unwrap();
        let err = gateway
            .call_duration(&CallId::new("CA404"))
            .await
            .unwrap_err();
        match err {
            TelephonyError::Provider { status, .. } => assert_eq!(status, 404),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn fetch_recording_returns_audio_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2010-04-01/Accounts/AC-test/Recordings/RE900.mp3"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp3-bytes".to_vec()))
            .mount(&server)
            .await;

        let gateway = TwilioGateway::new(test_config(server.uri())).unwrap();
        let audio = gateway.fetch_recording("RE900").await.unwrap();
        assert_eq!(&audio[..], b"mp3-bytes");
    }
}
