//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use serde::{Deserialize, Serialize};

/// Root configuration for the webhook breaker.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Breaker policy.
    pub breaker: BreakerConfig,

    /// Where breaker state lives.
    pub store: StoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// How many failures trip a breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureThreshold {
    /// Trip once this many failures are in the window.
    Absolute(u64),
    /// Trip once failures make up at least this share (0-100) of all calls
    /// in the window.
    Percentage(u32),
}

impl FailureThreshold {
    /// Whether `errors` out of `total` calls meet the threshold.
    pub fn is_met(&self, errors: u64, total: u64) -> bool {
        match *self {
            FailureThreshold::Absolute(limit) => errors >= limit,
            FailureThreshold::Percentage(pct) => {
                u128::from(errors) * 100 >= u128::from(pct) * u128::from(total)
            }
        }
    }
}

impl Default for FailureThreshold {
    fn default() -> Self {
        FailureThreshold::Percentage(50)
    }
}

/// Breaker policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Failure count or percentage that trips the breaker.
    pub failure_threshold: FailureThreshold,

    /// Calls needed in the window before the threshold is evaluated.
    pub failure_min_count: u64,

    /// Seconds a tripped breaker stays open.
    pub cooldown_seconds: u64,

    /// Width of the rolling window in seconds.
    pub ttl_seconds: u64,

    /// Event types guarded by the breaker.
    pub event_types: Vec<String>,

    /// Event types tracked but never short-circuited.
    pub dry_run_event_types: Vec<String>,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: FailureThreshold::default(),
            failure_min_count: 100,
            cooldown_seconds: 120,
            ttl_seconds: 300,
            event_types: Vec::new(),
            dry_run_event_types: Vec::new(),
        }
    }
}

/// Store backend selection.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Process-local store.
    Memory,

    /// Redis shared by all workers.
    Redis {
        /// Connection URL (e.g., "redis://127.0.0.1:6379/0").
        url: String,

        /// Connect/read/write timeout in milliseconds.
        #[serde(default = "default_store_timeout_ms")]
        timeout_ms: u64,

        /// Prefix for every key written.
        #[serde(default = "default_key_prefix")]
        key_prefix: String,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Memory
    }
}

fn default_store_timeout_ms() -> u64 {
    250
}

fn default_key_prefix() -> String {
    "breaker_board".to_string()
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
