//! Circuit breaker for synchronous outbound webhook calls.
//!
//! Tracks rolling failure counts per external app and short-circuits calls
//! to an app's webhooks once its failure threshold is exceeded.

pub mod clock;
pub mod config;
pub mod observability;
pub mod resilience;
pub mod store;
pub mod webhook;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AppConfig;
pub use resilience::{BreakerBoard, BreakerState, CallOutcome, DecisionEngine};
pub use store::{InMemoryStore, RedisStore, Store};
pub use webhook::{AppId, SyncResponse, Webhook, WebhookTarget};
