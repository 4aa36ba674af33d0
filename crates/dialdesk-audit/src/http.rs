//! REST client for the hosted document store

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use crate::error::{AuditError, Result};
use crate::log::AuditLog;

/// Document store connection configuration.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Base URL of the store's REST facade
    pub base_url: String,
    /// Bearer token, if the facade requires one
    pub api_key: Option<String>,
    /// Outbound request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        AuditConfig {
            base_url: "http://localhost:8085".to_string(),
            api_key: None,
            request_timeout_secs: 10,
        }
    }
}

impl AuditConfig {
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("AUDIT_STORE_URL")
            .map_err(|_| AuditError::Config("AUDIT_STORE_URL is not set".to_string()))?;
        Ok(AuditConfig {
            base_url,
            api_key: std::env::var("AUDIT_STORE_API_KEY").ok(),
            ..Default::default()
        })
    }
}

/// HTTP implementation of [`AuditLog`].
///
/// Facade routes: `POST /{collection}` appends, `PUT /{collection}/{key}`
/// upserts, `GET /{collection}/{key}` reads (404 means absent),
/// `POST /{collection}/query` runs a single-field equality query, and
/// `PATCH /{collection}/{key}` merges fields into one document.
#[derive(Clone)]
pub struct HttpAuditLog {
    http: reqwest::Client,
    config: AuditConfig,
}

impl HttpAuditLog {
    pub fn new(config: AuditConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(HttpAuditLog { http, config })
    }

    fn url(&self, tail: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), tail)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            Err(AuditError::Store { status, message })
        }
    }
}

#[async_trait]
impl AuditLog for HttpAuditLog {
    async fn append(&self, collection: &str, doc: Value) -> Result<()> {
        let response = self
            .request(self.http.post(self.url(collection)))
            .json(&doc)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn set(&self, collection: &str, key: &str, doc: Value) -> Result<()> {
        let response = self
            .request(self.http.put(self.url(&format!("{collection}/{key}"))))
            .json(&doc)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        let response = self
            .request(self.http.get(self.url(&format!("{collection}/{key}"))))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check(response).await?;
        Ok(Some(response.json().await?))
    }

    async fn find_one(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Option<Value>> {
        let response = self
            .request(self.http.post(self.url(&format!("{collection}/query"))))
            .json(&json!({"field": field, "value": value, "limit": 1}))
            .send()
            .await?;
        let response = Self::check(response).await?;
        let mut matches: Vec<Value> = response.json().await?;
        Ok(if matches.is_empty() {
            None
        } else {
            Some(matches.remove(0))
        })
    }

    async fn update_one(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        patch: Value,
    ) -> Result<bool> {
        // The facade has no query-and-patch; find the key first.
        let response = self
            .request(self.http.post(self.url(&format!("{collection}/query"))))
            .json(&json!({"field": field, "value": value, "limit": 1, "keys": true}))
            .send()
            .await?;
        let response = Self::check(response).await?;
        let keys: Vec<String> = response.json().await?;
        let Some(key) = keys.into_iter().next() else {
            return Ok(false);
        };

        let response = self
            .request(self.http.patch(self.url(&format!("{collection}/{key}"))))
            .json(&patch)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> AuditConfig {
        AuditConfig {
            base_url,
            api_key: None,
            request_timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn get_absent_key_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/call_mappings/CA-missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let log = HttpAuditLog::new(test_config(server.uri())).unwrap();
        assert_eq!(log.get("call_mappings", "CA-missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn find_one_unwraps_first_match() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/call_logs/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"CallSid": "CA1", "CallStatus": "completed"}
            ])))
            .mount(&server)
            .await;

        let log = HttpAuditLog::new(test_config(server.uri())).unwrap();
        let doc = log
            .find_one("call_logs", "CallSid", &serde_json::json!("CA1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc["CallStatus"], "completed");
    }

    #[tokio::test]
    async fn update_one_misses_when_query_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/call_logs/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let log = HttpAuditLog::new(test_config(server.uri())).unwrap();
        let updated = log
            .update_one(
                "call_logs",
                "CallSid",
                &serde_json::json!("CA2"),
                serde_json::json!({"RecordingSid": "RE1"}),
            )
            .await
            .unwrap();
        assert!(!updated);
    }
}
