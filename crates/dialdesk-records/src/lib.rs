//! # Dialdesk-Records
//!
//! CRM record store client for the dialdesk stack.
//!
//! This crate provides:
//! - The [`RecordStore`] trait: the narrow, domain-level interface the
//!   engine programs against (create call activity, create follow-up task,
//!   update a recording URL, fetch a lead)
//! - [`PodioClient`], the HTTP implementation with password-grant OAuth
//! - Typed field structs and the translation layer that turns them into the
//!   store's `{"fields": {"<field_id>": ...}}` wire shape
//! - Lead intelligence extraction for the agent workspace
//!
//! ## Architecture
//!
//! Field identifiers are opaque numeric keys configured per deployment; the
//! production ids ship as defaults in [`config`]. Everything above this
//! crate sees typed records, never stringified field-id dictionaries.

pub mod client;
pub mod config;
pub mod error;
pub mod fields;
pub mod intelligence;
pub mod oauth;
pub mod store;

pub use client::PodioClient;
pub use config::{AppIds, CallActivityFieldIds, RecordsConfig, TaskFieldIds};
pub use error::{RecordsError, Result};
pub use fields::{CallActivityFields, TaskFields};
pub use intelligence::{IntelligenceFieldIds, LeadIntelligence, LeadSummary};
pub use oauth::TokenManager;
pub use store::{LeadRecord, RecordId, RecordStore};
