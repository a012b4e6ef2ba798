//! Breaker board: the interception point around synchronous webhook calls.
//!
//! # Data Flow
//! ```text
//! wrapped(event_type, payload, webhook)
//!     → event type not managed?      call straight through, no bookkeeping
//!     → DecisionEngine::is_closed(app)
//!         open:   return CallOutcome::short_circuit() (dry-run: call anyway)
//!         closed: call, classify result, register success/error
//!     → original result returned unchanged
//! ```
//!
//! # Design Decisions
//! - Bookkeeping never fails the call; store problems are absorbed below
//! - Errors from the wrapped call propagate untouched and are not counted
//! - Dry-run event types are tracked exactly like enforced ones but never
//!   short-circuited

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::clock::Clock;
use crate::config::{validate_config, AppConfig, BreakerConfig, ConfigError};
use crate::observability::metrics;
use crate::resilience::circuit_breaker::{BreakerState, DecisionEngine};
use crate::resilience::outcome::{CallOutcome, Observed};
use crate::store::{self, Store};
use crate::webhook::{AppId, Webhook};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Enforce,
    DryRun,
}

/// Operator view of one app's breaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakerStatus {
    pub app_id: AppId,
    pub state: BreakerState,
    /// Unix seconds of the last trip, `0` if none is recorded.
    pub last_open: u64,
}

/// Wraps webhook calls with per-app circuit breaking.
#[derive(Clone)]
pub struct BreakerBoard {
    engine: Arc<DecisionEngine>,
    event_types: Arc<HashSet<String>>,
    dry_run_event_types: Arc<HashSet<String>>,
}

impl BreakerBoard {
    /// Build a board over an existing store.
    pub fn new(
        config: &BreakerConfig,
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let engine = DecisionEngine::new(config, store, clock)?;
        Ok(Self {
            engine: Arc::new(engine),
            event_types: Arc::new(config.event_types.iter().cloned().collect()),
            dry_run_event_types: Arc::new(config.dry_run_event_types.iter().cloned().collect()),
        })
    }

    /// Validate a full configuration, then build its store and board.
    pub fn from_config(config: &AppConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        validate_config(config)?;
        let store = store::from_config(&config.store, clock.clone())?;
        Self::new(&config.breaker, store, clock)
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    fn mode(&self, event_type: &str) -> Option<Mode> {
        if self.event_types.contains(event_type) {
            Some(Mode::Enforce)
        } else if self.dry_run_event_types.contains(event_type) {
            Some(Mode::DryRun)
        } else {
            None
        }
    }

    /// Whether calls for `event_type` go through breaker bookkeeping.
    pub fn manages(&self, event_type: &str) -> bool {
        self.mode(event_type).is_some()
    }

    /// Wrap `call` so that every invocation goes through the board.
    ///
    /// The returned closure has the same signature as `call`.
    pub fn wrap<F, P, W, O>(&self, call: F) -> impl Fn(&str, P, &W) -> O
    where
        F: Fn(&str, P, &W) -> O,
        W: Webhook + ?Sized,
        O: CallOutcome,
    {
        let board = self.clone();
        move |event_type: &str, payload: P, webhook: &W| board.call(&call, event_type, payload, webhook)
    }

    /// Run a single call through the board.
    pub fn call<F, P, W, O>(&self, call: F, event_type: &str, payload: P, webhook: &W) -> O
    where
        F: FnOnce(&str, P, &W) -> O,
        W: Webhook + ?Sized,
        O: CallOutcome,
    {
        let Some(mode) = self.mode(event_type) else {
            return call(event_type, payload, webhook);
        };

        let app_id = webhook.app_id();
        if !self.engine.is_closed(&app_id) {
            match mode {
                Mode::Enforce => {
                    tracing::debug!(app_id = %app_id, event_type, "Circuit open, short-circuiting webhook call");
                    metrics::record_short_circuit(event_type);
                    return O::short_circuit();
                }
                Mode::DryRun => {
                    tracing::info!(app_id = %app_id, event_type, "Circuit open (dry run), calling webhook anyway");
                }
            }
        }

        let result = call(event_type, payload, webhook);
        match result.observed() {
            Some(Observed::Success) => {
                metrics::record_call(event_type, true);
                self.engine.register_success(&app_id);
            }
            Some(Observed::Failure) => {
                metrics::record_call(event_type, false);
                self.engine.register_error(&app_id);
            }
            None => {}
        }
        result
    }

    pub fn status(&self, app_id: &AppId) -> BreakerStatus {
        BreakerStatus {
            app_id: app_id.clone(),
            state: self.engine.state(app_id),
            last_open: self.engine.store().last_open(app_id),
        }
    }

    /// Forget everything recorded for `app_id`.
    pub fn clear_state_for_app(&self, app_id: &AppId) {
        tracing::info!(app_id = %app_id, "Clearing breaker state");
        self.engine.store().clear_state_for_app(app_id);
    }
}
