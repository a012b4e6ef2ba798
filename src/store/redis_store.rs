//! Redis-backed breaker store shared by every worker in a fleet.
//!
//! # Responsibilities
//! - Keep one sorted set per counter key, scored by Unix seconds
//! - Append, prune and count in a single `MULTI`/`EXEC` round trip
//! - Keep last-open timestamps as plain string keys
//!
//! # Design Decisions
//! - Members are `"{timestamp}:{uuid}"` so events in the same second stay
//!   distinct
//! - Counter keys expire after the window so idle apps leave nothing behind
//! - Connection and protocol errors are logged and turned into `0`; a dead
//!   redis must never block webhook traffic
//! - Connections are checked out of a small idle list and never shared, so a
//!   slow server stalls only the caller waiting on it. Connect, handshake,
//!   read and write are all bounded by the configured timeout
//! - A connection that saw an error is dropped instead of returned

use std::sync::{Arc, Mutex};
use std::time::Duration;

use redis::Commands;
use thiserror::Error;
use uuid::Uuid;

use crate::clock::Clock;
use crate::observability::metrics;
use crate::store::{CounterKey, CounterName, Store};
use crate::webhook::AppId;

/// Failure talking to redis. Never leaves this module through [`Store`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Idle connections kept for reuse; extra ones are closed on check-in.
const MAX_IDLE_CONNECTIONS: usize = 16;

/// Breaker store on top of a redis server.
pub struct RedisStore {
    client: redis::Client,
    idle: Mutex<Vec<redis::Connection>>,
    timeout: Duration,
    key_prefix: String,
    clock: Arc<dyn Clock>,
}

impl RedisStore {
    /// Create a store for `url`. Only the URL is checked here; the
    /// connection is opened on first use.
    pub fn open(
        url: &str,
        timeout: Duration,
        key_prefix: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            idle: Mutex::new(Vec::new()),
            timeout,
            key_prefix: key_prefix.into(),
            clock,
        })
    }

    fn open_key(&self, app_id: &AppId) -> String {
        format!("{}:{}:last_open", self.key_prefix, app_id)
    }

    fn counter_key(&self, key: &CounterKey) -> String {
        format!("{}:{}", self.key_prefix, key)
    }

    fn connect(&self) -> Result<redis::Connection, StoreError> {
        // The timeout covers the TCP connect and the client handshake.
        let conn = self.client.get_connection_with_timeout(self.timeout)?;
        conn.set_read_timeout(Some(self.timeout))?;
        conn.set_write_timeout(Some(self.timeout))?;
        Ok(conn)
    }

    fn checkout(&self) -> Result<redis::Connection, StoreError> {
        // The idle lock is released before any network I/O.
        let idle = self.idle.lock().unwrap_or_else(|e| e.into_inner()).pop();
        match idle {
            Some(conn) => Ok(conn),
            None => self.connect(),
        }
    }

    fn checkin(&self, conn: redis::Connection) {
        let mut idle = self.idle.lock().unwrap_or_else(|e| e.into_inner());
        if idle.len() < MAX_IDLE_CONNECTIONS {
            idle.push(conn);
        }
    }

    /// Number of connections waiting for reuse.
    pub fn idle_connections(&self) -> usize {
        self.idle.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut redis::Connection) -> redis::RedisResult<T>,
    ) -> Result<T, StoreError> {
        let mut conn = self.checkout()?;
        let value = f(&mut conn)?;
        self.checkin(conn);
        Ok(value)
    }

    fn try_register(&self, key: &CounterKey, ttl_seconds: u64) -> Result<u64, StoreError> {
        let key = self.counter_key(key);
        let now = self.clock.now();
        let cutoff = now as i64 - ttl_seconds as i64;
        let member = format!("{}:{}", now, Uuid::new_v4());

        let (count,): (u64,) = self.with_connection(|conn| {
            redis::pipe()
                .atomic()
                .zrembyscore(&key, "-inf", cutoff)
                .ignore()
                .zadd(&key, &member, now)
                .ignore()
                .zcard(&key)
                .expire(&key, ttl_seconds as i64)
                .ignore()
                .query(conn)
        })?;
        Ok(count)
    }
}

fn fail_open(op: &'static str, error: &StoreError) {
    tracing::warn!(op, error = %error, "Breaker store unavailable, failing open");
    metrics::record_store_error(op);
}

impl Store for RedisStore {
    fn last_open(&self, app_id: &AppId) -> u64 {
        let key = self.open_key(app_id);
        match self.with_connection(|conn| conn.get::<_, Option<u64>>(&key)) {
            Ok(value) => value.unwrap_or(0),
            Err(e) => {
                fail_open("last_open", &e);
                0
            }
        }
    }

    fn update_open(&self, app_id: &AppId, timestamp: u64) {
        let key = self.open_key(app_id);
        if let Err(e) = self.with_connection(|conn| conn.set::<_, _, ()>(&key, timestamp)) {
            fail_open("update_open", &e);
        }
    }

    fn register_event_returning_count(&self, key: &CounterKey, ttl_seconds: u64) -> u64 {
        self.try_register(key, ttl_seconds).unwrap_or_else(|e| {
            fail_open("register_event", &e);
            0
        })
    }

    fn clear_state_for_app(&self, app_id: &AppId) {
        let mut keys = vec![self.open_key(app_id)];
        keys.extend(
            CounterName::ALL
                .iter()
                .map(|name| self.counter_key(&CounterKey::new(app_id, *name))),
        );
        if let Err(e) = self.with_connection(|conn| conn.del::<_, ()>(&keys)) {
            fail_open("clear_state", &e);
        }
    }
}
