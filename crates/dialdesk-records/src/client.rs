//! Record store REST client

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::RecordsConfig;
use crate::error::{RecordsError, Result};
use crate::fields::{CallActivityFields, TaskFields};
use crate::oauth::TokenManager;
use crate::store::{LeadRecord, RecordId, RecordStore};

/// HTTP implementation of [`RecordStore`].
///
/// One retry on a 401: the cached token is invalidated and the request is
/// replayed with a fresh one. A second 401 is a hard auth failure.
#[derive(Clone)]
pub struct PodioClient {
    http: reqwest::Client,
    tokens: Arc<TokenManager>,
    config: RecordsConfig,
}

impl PodioClient {
    pub fn new(config: RecordsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        let tokens = Arc::new(TokenManager::new(http.clone(), &config));
        Ok(PodioClient {
            http,
            tokens,
            config,
        })
    }

    /// Explicit token refresh, for startup validation.
    pub async fn refresh_token(&self) -> Result<()> {
        self.tokens.refresh().await?;
        Ok(())
    }

    fn url(&self, tail: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), tail)
    }

    async fn send_json(
        &self,
        method: reqwest::Method,
        url: &str,
        body: &Value,
    ) -> Result<Value> {
        let mut token = self.tokens.token().await?;
        for attempt in 0..2 {
            let response = self
                .http
                .request(method.clone(), url)
                .header("Authorization", format!("OAuth2 {token}"))
                .json(body)
                .send()
                .await?;

            match response.status() {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN if attempt == 0 => {
                    debug!("store rejected token, refreshing once");
                    self.tokens.invalidate().await;
                    token = self.tokens.refresh().await?;
                }
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    let message = response.text().await.unwrap_or_default();
                    return Err(RecordsError::Auth(message));
                }
                StatusCode::NOT_FOUND => {
                    return Err(RecordsError::NotFound(url.to_string()));
                }
                status if !status.is_success() => {
                    let message = response.text().await.unwrap_or_default();
                    warn!(status = status.as_u16(), "record store request failed");
                    return Err(RecordsError::Api {
                        status: status.as_u16(),
                        message,
                    });
                }
                _ => return Ok(response.json().await?),
            }
        }
        Err(RecordsError::Auth("token refresh loop exhausted".to_string()))
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let mut token = self.tokens.token().await?;
        for attempt in 0..2 {
            let response = self
                .http
                .get(url)
                .header("Authorization", format!("OAuth2 {token}"))
                .send()
                .await?;

            match response.status() {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN if attempt == 0 => {
                    self.tokens.invalidate().await;
                    token = self.tokens.refresh().await?;
                }
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    let message = response.text().await.unwrap_or_default();
                    return Err(RecordsError::Auth(message));
                }
                StatusCode::NOT_FOUND => {
                    return Err(RecordsError::NotFound(url.to_string()));
                }
                status if !status.is_success() => {
                    let message = response.text().await.unwrap_or_default();
                    return Err(RecordsError::Api {
                        status: status.as_u16(),
                        message,
                    });
                }
                _ => return Ok(response.json().await?),
            }
        }
        Err(RecordsError::Auth("token refresh loop exhausted".to_string()))
    }

    fn item_id_from(body: &Value) -> Result<RecordId> {
        body.get("item_id")
            .and_then(|id| {
                id.as_u64()
                    .map(|n| n.to_string())
                    .or_else(|| id.as_str().map(String::from))
            })
            .map(RecordId::new)
            .ok_or_else(|| RecordsError::Api {
                status: 200,
                message: "create response missing item_id".to_string(),
            })
    }
}

#[async_trait]
impl RecordStore for PodioClient {
    async fn create_call_activity(&self, fields: &CallActivityFields) -> Result<RecordId> {
        let url = self.url(&format!("item/app/{}/", self.config.apps.call_activity));
        let body = fields.to_wire(&self.config.call_activity_fields);
        let response = self.send_json(reqwest::Method::POST, &url, &body).await?;
        let id = Self::item_id_from(&response)?;
        debug!(item_id = %id, "call activity created");
        Ok(id)
    }

    async fn update_recording_url(
        &self,
        record_id: &RecordId,
        recording_url: &str,
    ) -> Result<()> {
        let url = self.url(&format!("item/{record_id}/value"));
        let body =
            CallActivityFields::recording_patch(&self.config.call_activity_fields, recording_url);
        self.send_json(reqwest::Method::PUT, &url, &body).await?;
        debug!(item_id = %record_id, "recording url updated");
        Ok(())
    }

    async fn create_task(&self, fields: &TaskFields) -> Result<RecordId> {
        let url = self.url(&format!("item/app/{}/", self.config.apps.follow_up_task));
        let body = fields.to_wire(&self.config.task_fields);
        let response = self.send_json(reqwest::Method::POST, &url, &body).await?;
        let id = Self::item_id_from(&response)?;
        debug!(item_id = %id, "follow-up task created");
        Ok(id)
    }

    async fn get_lead(&self, record_id: &RecordId) -> Result<LeadRecord> {
        let url = self.url(&format!("item/{record_id}"));
        let raw = self.get_json(&url).await?;
        Ok(LeadRecord {
            id: record_id.clone(),
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> PodioClient {
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access_token": "tok-live"})),
            )
            .mount(server)
            .await;

        let config = RecordsConfig {
            client_id: "cid".to_string(),
            client_secret: "cs".to_string(),
            username: "u".to_string(),
            password: "p".to_string(),
            api_base: server.uri(),
            token_url: format!("{}/oauth/token", server.uri()),
            ..Default::default()
        };
        PodioClient::new(config).unwrap()
    }

    fn sample_activity() -> CallActivityFields {
        CallActivityFields {
            title: "Call: Voicemail".to_string(),
            lead_record_id: 42,
            date_of_call: Utc::now(),
            duration_seconds: None,
            recording_url: None,
            disposition_code: Some("Voicemail".to_string()),
            agent_notes: None,
            motivation_level: None,
            next_action_date: None,
            asking_price: None,
        }
    }

    #[tokio::test]
    async fn create_call_activity_posts_to_app_and_returns_item_id() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        Mock::given(method("POST"))
            .and(path("/item/app/30549170/"))
            .and(header("Authorization", "OAuth2 tok-live"))
            .and(body_string_contains("274851083"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"item_id": 9001})),
            )
            .mount(&server)
            .await;

        let id = client.create_call_activity(&sample_activity()).await.unwrap();
        assert_eq!(id.as_str(), "9001");
    }

    #[tokio::test]
    async fn persistent_unauthorized_is_auth_error() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        Mock::given(method("POST"))
            .and(path("/item/app/30549170/"))
            .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
            .mount(&server)
            .await;

        let err = client.create_call_activity(&sample_activity()).await.unwrap_err();
        assert!(err.is_auth());
    }

    #[tokio::test]
    async fn update_recording_url_puts_value_patch() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        Mock::given(method("PUT"))
            .and(path("/item/9001/value"))
            .and(body_string_contains("274769801"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        client
            .update_recording_url(&RecordId::new("9001"), "/play_recording/RE1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn get_lead_missing_item_is_not_found() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        Mock::given(method("GET"))
            .and(path("/item/404404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client.get_lead(&RecordId::new("404404")).await.unwrap_err();
        assert!(matches!(err, RecordsError::NotFound(_)));
    }
}
