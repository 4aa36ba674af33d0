//! Server configuration

use anyhow::{bail, Result};

/// Listener and addressing configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind
    pub bind_addr: String,
    /// Public base URL of this deployment; webhook callback URLs and
    /// recording proxy URLs are built from it.
    pub public_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "0.0.0.0:8080".to_string(),
            public_base_url: "http://localhost:8080".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = ServerConfig::default();
        if let Ok(addr) = std::env::var("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(url) = std::env::var("PUBLIC_BASE_URL") {
            config.public_base_url = url;
        }
        if !config.public_base_url.starts_with("http") {
            bail!("PUBLIC_BASE_URL must be an absolute URL");
        }
        Ok(config)
    }
}
