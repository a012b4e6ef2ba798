//! Webhook collaborator contract.
//!
//! The breaker only needs to know who owns a webhook. Transport, payload
//! generation and signing live elsewhere.

pub mod types;

pub use types::{AppId, SyncResponse, Webhook, WebhookTarget};
