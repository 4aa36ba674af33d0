//! OAuth token management
//!
//! Password-grant token client. The token lives inside the manager behind a
//! lock and is handed to each request; there is no module-level shared
//! state, and `refresh` can be called explicitly when the store rejects a
//! cached token.

use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::RecordsConfig;
use crate::error::{RecordsError, Result};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Cached-token OAuth client, injected into [`crate::PodioClient`].
pub struct TokenManager {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    username: String,
    password: String,
    token: RwLock<Option<String>>,
}

impl TokenManager {
    pub fn new(http: reqwest::Client, config: &RecordsConfig) -> Self {
        TokenManager {
            http,
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            token: RwLock::new(None),
        }
    }

    /// Current token, fetching one if none is cached.
    pub async fn token(&self) -> Result<String> {
        if let Some(token) = self.token.read().await.clone() {
            return Ok(token);
        }
        self.refresh().await
    }

    /// Force a new token from the OAuth endpoint.
    pub async fn refresh(&self) -> Result<String> {
        if self.client_id.is_empty()
            || self.client_secret.is_empty()
            || self.username.is_empty()
            || self.password.is_empty()
        {
            return Err(RecordsError::Auth(
                "record store credentials not fully configured".to_string(),
            ));
        }

        let params = [
            ("grant_type", "password"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
        ];

        let response = self.http.post(&self.token_url).form(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            warn!(status, "token refresh rejected");
            return Err(RecordsError::Auth(format!(
                "token endpoint returned {status}: {message}"
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| RecordsError::Auth(format!("malformed token response: {e}")))?;

        debug!("record store token obtained");
        *self.token.write().await = Some(body.access_token.clone());
        Ok(body.access_token)
    }

    /// Drop the cached token, forcing a refresh on next use.
    pub async fn invalidate(&self) {
        *self.token.write().await = None;
    }
}
