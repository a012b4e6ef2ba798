//! Circuit breaker decision engine for webhook owners.
//!
//! # States
//! - Closed: calls pass through
//! - Open: the app's endpoint is assumed broken, calls are short-circuited
//!
//! # State Transitions
//! ```text
//! Closed → Open:   register_error with the threshold met over the window
//! Open → Closed:   register_success once the cooldown has elapsed
//! Open (stale):    is_closed admits calls after the cooldown, but last_open
//!                  is only zeroed by a success; an error refreshes it
//! ```
//!
//! # Design Decisions
//! - Per-app breaker, all state kept in the [`Store`]
//! - Threshold re-evaluated on every error, in both directions: an app whose
//!   window no longer meets the threshold is moved back to closed
//! - The engine itself holds no mutable state

use serde::Serialize;
use std::sync::Arc;

use crate::clock::Clock;
use crate::config::{validate_breaker, BreakerConfig, ConfigError, FailureThreshold};
use crate::observability::metrics;
use crate::store::{CounterKey, CounterName, Store};
use crate::webhook::AppId;

/// Breaker state as seen by call admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
    Closed,
    Open,
}

/// Turns rolling counts into open/closed decisions.
pub struct DecisionEngine {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    failure_threshold: FailureThreshold,
    failure_min_count: u64,
    cooldown_seconds: u64,
    ttl_seconds: u64,
}

impl DecisionEngine {
    /// Build an engine; fails on an invalid breaker configuration.
    pub fn new(
        config: &BreakerConfig,
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        validate_breaker(config)?;
        Ok(Self {
            store,
            clock,
            failure_threshold: config.failure_threshold,
            failure_min_count: config.failure_min_count,
            cooldown_seconds: config.cooldown_seconds,
            ttl_seconds: config.ttl_seconds,
        })
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    fn cooldown_elapsed(&self, last_open: u64, now: u64) -> bool {
        now.saturating_sub(last_open) >= self.cooldown_seconds
    }

    /// Whether calls for `app_id` may go through.
    pub fn is_closed(&self, app_id: &AppId) -> bool {
        let last_open = self.store.last_open(app_id);
        last_open == 0 || self.cooldown_elapsed(last_open, self.clock.now())
    }

    pub fn state(&self, app_id: &AppId) -> BreakerState {
        if self.is_closed(app_id) {
            BreakerState::Closed
        } else {
            BreakerState::Open
        }
    }

    fn register(&self, app_id: &AppId, name: CounterName) -> u64 {
        self.store
            .register_event_returning_count(&CounterKey::new(app_id, name), self.ttl_seconds)
    }

    /// Count a failed call and re-evaluate the threshold.
    pub fn register_error(&self, app_id: &AppId) {
        let errors = self.register(app_id, CounterName::Error);
        let total = self.register(app_id, CounterName::Total);
        let last_open = self.store.last_open(app_id);

        // A store that could not count reports zero errors, which never trips.
        let tripped = errors > 0
            && total >= self.failure_min_count
            && self.failure_threshold.is_met(errors, total);

        if tripped {
            self.store.update_open(app_id, self.clock.now());
            if last_open == 0 {
                tracing::warn!(
                    app_id = %app_id,
                    errors,
                    total,
                    cooldown_secs = self.cooldown_seconds,
                    "Circuit breaker tripped"
                );
                metrics::record_trip();
            }
        } else if last_open != 0 {
            tracing::debug!(app_id = %app_id, errors, total, "Threshold no longer met, closing breaker");
            self.store.update_open(app_id, 0);
        }
    }

    /// Count a successful call; closes a breaker whose cooldown has elapsed.
    pub fn register_success(&self, app_id: &AppId) {
        self.register(app_id, CounterName::Total);

        let last_open = self.store.last_open(app_id);
        if last_open != 0 && self.cooldown_elapsed(last_open, self.clock.now()) {
            self.store.update_open(app_id, 0);
            tracing::info!(app_id = %app_id, "Circuit breaker closed");
            metrics::record_reset();
        }
    }
}
