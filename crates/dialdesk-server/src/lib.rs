//! # Dialdesk-Server
//!
//! The HTTP surface: agent-facing API routes plus the telephony provider's
//! webhook endpoints, wired over [`dialdesk_engine::CallFlowEngine`].
//!
//! Webhook routes always acknowledge with 200 regardless of processing
//! outcome; failing them would only trigger provider-side retry storms.
//! The one user-visible failure is the disposition submission, which
//! reports a structured error when the record store write fails.

pub mod config;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use routes::router;
pub use state::AppState;
