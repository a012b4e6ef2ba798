//! Rolling event counter storage.
//!
//! # Data Flow
//! ```text
//! DecisionEngine
//!     → register_event_returning_count(key, ttl)   (error / total counters)
//!     → last_open(app) / update_open(app, ts)      (trip state)
//!
//! Backends:
//!     memory.rs       process-local, DashMap guarded
//!     redis_store.rs  shared across processes, atomic pipelines
//! ```
//!
//! # Design Decisions
//! - Append-only timestamp log per counter key, never read-modify-write
//! - Store failures never reach the caller: counts and timestamps fall
//!   back to `0`, writes are best-effort
//! - State is created lazily and only removed by TTL pruning or an explicit
//!   clear

pub mod memory;
pub mod redis_store;

use std::fmt;
use std::sync::Arc;

use crate::clock::Clock;
use crate::config::StoreConfig;
use crate::webhook::AppId;

pub use self::memory::InMemoryStore;
pub use self::redis_store::{RedisStore, StoreError};

/// Name of a rolling counter kept per app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterName {
    /// Failed calls.
    Error,
    /// Every classified call, failed or not.
    Total,
}

impl CounterName {
    pub const ALL: [CounterName; 2] = [CounterName::Error, CounterName::Total];

    pub fn as_str(&self) -> &'static str {
        match self {
            CounterName::Error => "error",
            CounterName::Total => "total",
        }
    }
}

/// Key scoping a rolling counter to one app.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CounterKey(String);

impl CounterKey {
    pub fn new(app_id: &AppId, name: CounterName) -> Self {
        Self(format!("{}:{}", app_id, name.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CounterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage behind the breaker.
///
/// Implementations must never panic or surface backend failures: a store
/// that cannot answer reports `0`, meaning "never tripped" and "no events".
pub trait Store: Send + Sync {
    /// Last time the breaker for `app_id` was tripped, `0` if never.
    fn last_open(&self, app_id: &AppId) -> u64;

    /// Record a trip at `timestamp`; `0` closes the breaker.
    fn update_open(&self, app_id: &AppId, timestamp: u64);

    /// Append "now" to the rolling set for `key` and return how many events
    /// are left in the trailing `ttl_seconds` window.
    fn register_event_returning_count(&self, key: &CounterKey, ttl_seconds: u64) -> u64;

    /// Drop all state for `app_id`. Clearing an unknown app is a no-op.
    fn clear_state_for_app(&self, app_id: &AppId);
}

/// Whether an event registered at `timestamp` is still inside the window
/// ending at `now`. The window is `(now - ttl, now]`.
pub(crate) fn in_window(now: u64, timestamp: u64, ttl_seconds: u64) -> bool {
    now.saturating_sub(timestamp) < ttl_seconds
}

/// Build the store selected by configuration.
pub fn from_config(config: &StoreConfig, clock: Arc<dyn Clock>) -> Result<Arc<dyn Store>, StoreError> {
    match config {
        StoreConfig::Memory => {
            tracing::info!("Using in-memory breaker store");
            Ok(Arc::new(InMemoryStore::new(clock)))
        }
        StoreConfig::Redis {
            url,
            timeout_ms,
            key_prefix,
        } => {
            let store = RedisStore::open(
                url,
                std::time::Duration::from_millis(*timeout_ms),
                key_prefix.clone(),
                clock,
            )?;
            tracing::info!(prefix = %key_prefix, "Using redis breaker store");
            Ok(Arc::new(store))
        }
    }
}
