//! # dxm-webhook: Lead Delivery
//!
//! Posts quote and vendor registration envelopes to a single external
//! endpoint (typically a spreadsheet-backed script). This crate is the only
//! place in the workspace that talks to that endpoint.
//!
//! ## Delivery Semantics
//!
//! - No URL configured: [`WebhookError::NotConfigured`], zero network calls.
//! - Fire-and-forget (default): a dispatched request is success whatever the
//!   endpoint answers.
//! - Confirmed: a non-2xx status is [`WebhookError::Rejected`].
//! - No retries and no queue.

pub mod client;
pub mod config;
pub mod error;

pub use client::{DeliveryReceipt, LeadWebhook};
pub use config::{ConfigError, DeliveryMode, WebhookConfig};
pub use error::{WebhookError, NOT_CONFIGURED_DIAGNOSTIC};
