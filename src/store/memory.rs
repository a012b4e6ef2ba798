//! Process-local breaker store.

use dashmap::DashMap;
use std::sync::Arc;

use crate::clock::Clock;
use crate::store::{in_window, CounterKey, CounterName, Store};
use crate::webhook::AppId;

/// A thread-safe in-memory store.
///
/// Meant for tests and single-node deployments: state is only shared by the
/// threads of one process, so use the redis store for a fleet. Each DashMap
/// entry is locked for the whole append-prune-count sequence, so concurrent
/// registrations on a key never lose an event.
///
/// A key is only pruned when it is registered again. Apps that stop sending
/// events keep their last window in memory until [`purge_expired`] runs or
/// their state is cleared.
///
/// [`purge_expired`]: InMemoryStore::purge_expired
#[derive(Clone)]
pub struct InMemoryStore {
    last_open: Arc<DashMap<AppId, u64>>,
    events: Arc<DashMap<CounterKey, Vec<u64>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            last_open: Arc::new(DashMap::new()),
            events: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Number of counter keys currently held.
    pub fn tracked_keys(&self) -> usize {
        self.events.len()
    }

    /// Drop events older than `ttl_seconds` on every key and forget keys left
    /// empty. Returns the number of keys removed.
    pub fn purge_expired(&self, ttl_seconds: u64) -> usize {
        let now = self.clock.now();
        let before = self.events.len();
        self.events.retain(|_, events| {
            events.retain(|&ts| in_window(now, ts, ttl_seconds));
            !events.is_empty()
        });
        before.saturating_sub(self.events.len())
    }
}

impl Store for InMemoryStore {
    fn last_open(&self, app_id: &AppId) -> u64 {
        self.last_open.get(app_id).map(|r| *r.value()).unwrap_or(0)
    }

    fn update_open(&self, app_id: &AppId, timestamp: u64) {
        self.last_open.insert(app_id.clone(), timestamp);
    }

    fn register_event_returning_count(&self, key: &CounterKey, ttl_seconds: u64) -> u64 {
        let now = self.clock.now();
        let mut entry = self.events.entry(key.clone()).or_default();
        entry.push(now);
        entry.retain(|&ts| in_window(now, ts, ttl_seconds));
        entry.len() as u64
    }

    fn clear_state_for_app(&self, app_id: &AppId) {
        self.last_open.remove(app_id);
        for name in CounterName::ALL {
            self.events.remove(&CounterKey::new(app_id, name));
        }
    }
}
