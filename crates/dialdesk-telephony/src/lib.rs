//! # Dialdesk-Telephony
//!
//! Telephony gateway client for the dialdesk stack.
//!
//! This crate provides:
//! - The [`TelephonyGateway`] trait the rest of the stack programs against
//! - [`TwilioGateway`], a REST client for the hosted provider
//! - Call and recording resource types
//!
//! ## Architecture
//!
//! The gateway is the only component that knows provider wire shapes. Call
//! correlation and disposition handling live in `dialdesk-engine` and see
//! only [`CallId`]s and plain values, so the provider can be swapped out (or
//! faked in tests) behind the trait.

pub mod config;
pub mod error;
pub mod gateway;
pub mod twilio;
pub mod types;

pub use config::TelephonyConfig;
pub use error::{Result, TelephonyError};
pub use gateway::TelephonyGateway;
pub use twilio::TwilioGateway;
pub use types::{CallId, CallbackUrls, CallResource};
