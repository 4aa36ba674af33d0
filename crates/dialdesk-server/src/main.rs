//! dialdesk-server binary

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dialdesk_audit::{AuditConfig, HttpAuditLog};
use dialdesk_engine::{CallFlowEngine, DispositionRules, EngineConfig};
use dialdesk_records::{IntelligenceFieldIds, PodioClient, RecordsConfig};
use dialdesk_server::{router, AppState, ServerConfig};
use dialdesk_telephony::{TelephonyConfig, TwilioGateway};

/// Keep only enough of a credential to recognize it in logs.
fn masked(value: &str) -> String {
    if value.chars().count() <= 6 {
        return "***".to_string();
    }
    let prefix: String = value.chars().take(6).collect();
    format!("{prefix}***")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let server_config = ServerConfig::from_env().context("server configuration")?;
    let telephony_config = TelephonyConfig::from_env().context("telephony configuration")?;
    let records_config = RecordsConfig::from_env().context("record store configuration")?;
    let audit_config = AuditConfig::from_env().context("audit store configuration")?;

    info!(
        twilio_account = %masked(&telephony_config.account_sid),
        record_store_user = %records_config.username,
        "external credentials loaded"
    );

    let gateway = Arc::new(TwilioGateway::new(telephony_config)?);
    let records = Arc::new(PodioClient::new(records_config)?);
    let audit = Arc::new(HttpAuditLog::new(audit_config)?);

    let engine = Arc::new(CallFlowEngine::new(
        gateway.clone(),
        records.clone(),
        audit,
        DispositionRules::default(),
        EngineConfig::new(server_config.public_base_url.clone()),
    ));

    let state = AppState {
        engine,
        gateway,
        records,
        intelligence_fields: Arc::new(IntelligenceFieldIds::default()),
        public_base_url: server_config.public_base_url.clone(),
    };

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&server_config.bind_addr)
        .await
        .with_context(|| format!("binding {}", server_config.bind_addr))?;
    info!(addr = %server_config.bind_addr, public = %server_config.public_base_url, "dialdesk listening");
    axum::serve(listener, app).await.context("server exited")?;
    Ok(())
}
