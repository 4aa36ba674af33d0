//! Configuration for the record store client
//!
//! Field identifiers are opaque numeric keys assigned by the store when the
//! apps were provisioned. The defaults below are the production workspace
//! schema; override them per deployment.

use crate::error::{RecordsError, Result};

/// Record store connection and credential configuration.
#[derive(Debug, Clone)]
pub struct RecordsConfig {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    /// API base URL; overridable for tests
    pub api_base: String,
    /// OAuth token endpoint
    pub token_url: String,
    /// Outbound request timeout in seconds
    pub request_timeout_secs: u64,
    pub apps: AppIds,
    pub call_activity_fields: CallActivityFieldIds,
    pub task_fields: TaskFieldIds,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        RecordsConfig {
            client_id: String::new(),
            client_secret: String::new(),
            username: String::new(),
            password: String::new(),
            api_base: "https://api.podio.com".to_string(),
            token_url: "https://podio.com/oauth/token".to_string(),
            request_timeout_secs: 10,
            apps: AppIds::default(),
            call_activity_fields: CallActivityFieldIds::default(),
            task_fields: TaskFieldIds::default(),
        }
    }
}

impl RecordsConfig {
    /// Load credentials from environment variables; ids keep their
    /// production defaults unless overridden.
    pub fn from_env() -> Result<Self> {
        let mut config = RecordsConfig {
            client_id: require_env("PODIO_CLIENT_ID")?,
            client_secret: require_env("PODIO_CLIENT_SECRET")?,
            username: require_env("PODIO_USERNAME")?,
            password: require_env("PODIO_PASSWORD")?,
            ..Default::default()
        };
        if let Ok(app_id) = std::env::var("PODIO_CALL_ACTIVITY_APP_ID") {
            config.apps.call_activity = app_id
                .parse()
                .map_err(|_| RecordsError::Config("PODIO_CALL_ACTIVITY_APP_ID must be numeric".to_string()))?;
        }
        Ok(config)
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| RecordsError::Config(format!("{name} is not set")))
}

/// App identifiers for the three apps this system writes to.
#[derive(Debug, Clone)]
pub struct AppIds {
    pub call_activity: u64,
    pub master_lead: u64,
    pub follow_up_task: u64,
}

impl Default for AppIds {
    fn default() -> Self {
        AppIds {
            call_activity: 30549170,
            master_lead: 30549135,
            follow_up_task: 30549201,
        }
    }
}

/// Field ids for the call-activity app.
#[derive(Debug, Clone)]
pub struct CallActivityFieldIds {
    pub title: u64,
    pub lead_relationship: u64,
    pub date_of_call: u64,
    pub call_duration: u64,
    pub recording_url: u64,
    pub disposition_code: u64,
    pub agent_notes: u64,
    pub motivation_level: u64,
    pub next_action_date: u64,
    pub asking_price: u64,
}

impl Default for CallActivityFieldIds {
    fn default() -> Self {
        CallActivityFieldIds {
            title: 274769797,
            lead_relationship: 274851864,
            date_of_call: 274769799,
            call_duration: 274769800,
            recording_url: 274769801,
            disposition_code: 274851083,
            agent_notes: 274851084,
            motivation_level: 274851085,
            next_action_date: 274851086,
            asking_price: 274851087,
        }
    }
}

/// Field ids for the follow-up task app.
#[derive(Debug, Clone)]
pub struct TaskFieldIds {
    pub title: u64,
    pub task_type: u64,
    pub due_date: u64,
    pub lead_relationship: u64,
}

impl Default for TaskFieldIds {
    fn default() -> Self {
        TaskFieldIds {
            title: 274852401,
            task_type: 274852402,
            due_date: 274852403,
            lead_relationship: 274852404,
        }
    }
}
