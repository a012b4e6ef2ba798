//! Shared fixtures for breaker integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use webhook_breaker::config::{BreakerConfig, FailureThreshold};
use webhook_breaker::store::CounterKey;
use webhook_breaker::{AppId, BreakerBoard, InMemoryStore, ManualClock, RedisStore, Store, WebhookTarget};

pub const SHIPPING: &str = "shipping_list_methods_for_checkout";
pub const TAXES: &str = "checkout_calculate_taxes";
pub const UNMANAGED: &str = "order_created";

pub const START: u64 = 1_700_000_000;

/// Store wrapper that counts every access.
pub struct CountingStore {
    inner: InMemoryStore,
    hits: AtomicUsize,
}

impl CountingStore {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            inner: InMemoryStore::new(clock),
            hits: AtomicUsize::new(0),
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }
}

impl Store for CountingStore {
    fn last_open(&self, app_id: &AppId) -> u64 {
        self.hit();
        self.inner.last_open(app_id)
    }

    fn update_open(&self, app_id: &AppId, timestamp: u64) {
        self.hit();
        self.inner.update_open(app_id, timestamp)
    }

    fn register_event_returning_count(&self, key: &CounterKey, ttl_seconds: u64) -> u64 {
        self.hit();
        self.inner.register_event_returning_count(key, ttl_seconds)
    }

    fn clear_state_for_app(&self, app_id: &AppId) {
        self.hit();
        self.inner.clear_state_for_app(app_id)
    }
}

pub struct Fixture {
    pub board: BreakerBoard,
    pub store: Arc<CountingStore>,
    pub clock: Arc<ManualClock>,
}

pub fn breaker_config(threshold: FailureThreshold, min_count: u64) -> BreakerConfig {
    BreakerConfig {
        failure_threshold: threshold,
        failure_min_count: min_count,
        cooldown_seconds: 600,
        ttl_seconds: 300,
        event_types: vec![SHIPPING.to_string()],
        dry_run_event_types: vec![TAXES.to_string()],
    }
}

pub fn fixture(config: BreakerConfig) -> Fixture {
    let clock = Arc::new(ManualClock::new(START));
    let store = Arc::new(CountingStore::new(clock.clone()));
    let board = BreakerBoard::new(&config, store.clone(), clock.clone()).unwrap();
    Fixture { board, store, clock }
}

pub fn webhook(app_id: i64) -> WebhookTarget {
    WebhookTarget::new(1, app_id, format!("https://app-{app_id}.example/webhook"))
}

/// Redis store pointed at a port nothing listens on.
pub fn unreachable_redis(clock: Arc<ManualClock>) -> RedisStore {
    RedisStore::open(
        "redis://127.0.0.1:1/0",
        Duration::from_millis(200),
        "breaker_board",
        clock,
    )
    .unwrap()
}

/// Redis store for `addr` with a 200ms timeout.
pub fn redis_at(addr: SocketAddr, clock: Arc<ManualClock>) -> RedisStore {
    RedisStore::open(
        &format!("redis://{addr}/0"),
        Duration::from_millis(200),
        "breaker_board",
        clock,
    )
    .unwrap()
}

/// Start a listener that accepts connections and never answers.
pub fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => held.push(stream),
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a minimal RESP server backed by in-memory strings and sorted sets.
///
/// Understands the handshake (`CLIENT`, `HELLO`, `SELECT`, `PING`),
/// `MULTI`/`EXEC`, and the commands the breaker store sends.
pub fn start_mock_redis() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let data = Arc::new(Mutex::new(MockData::default()));

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            let data = data.clone();
            thread::spawn(move || serve_resp(stream, data));
        }
    });

    addr
}

#[derive(Default)]
struct MockData {
    strings: HashMap<String, String>,
    zsets: HashMap<String, HashMap<String, f64>>,
}

fn serve_resp(stream: TcpStream, data: Arc<Mutex<MockData>>) {
    let mut writer = match stream.try_clone() {
        Ok(writer) => writer,
        Err(_) => return,
    };
    let mut reader = BufReader::new(stream);
    let mut queued: Option<Vec<Vec<String>>> = None;

    while let Some(args) = read_command(&mut reader) {
        let Some(name) = args.first().map(|a| a.to_ascii_uppercase()) else {
            continue;
        };
        let reply = match name.as_str() {
            "MULTI" => {
                queued = Some(Vec::new());
                "+OK\r\n".to_string()
            }
            "EXEC" => {
                let commands = queued.take().unwrap_or_default();
                let mut data = data.lock().unwrap();
                let mut reply = format!("*{}\r\n", commands.len());
                for command in &commands {
                    reply.push_str(&apply(&mut data, command));
                }
                reply
            }
            _ => match queued.as_mut() {
                Some(commands) => {
                    commands.push(args);
                    "+QUEUED\r\n".to_string()
                }
                None => apply(&mut data.lock().unwrap(), &args),
            },
        };
        if writer.write_all(reply.as_bytes()).is_err() {
            return;
        }
    }
}

fn read_command(reader: &mut BufReader<TcpStream>) -> Option<Vec<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line).ok()? == 0 {
        return None;
    }
    let count: usize = line.trim_end().strip_prefix('*')?.parse().ok()?;
    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        line.clear();
        reader.read_line(&mut line).ok()?;
        let len: usize = line.trim_end().strip_prefix('$')?.parse().ok()?;
        let mut buf = vec![0; len + 2];
        reader.read_exact(&mut buf).ok()?;
        buf.truncate(len);
        args.push(String::from_utf8(buf).ok()?);
    }
    Some(args)
}

fn parse_score(raw: &str) -> (f64, bool) {
    let (raw, exclusive) = match raw.strip_prefix('(') {
        Some(rest) => (rest, true),
        None => (raw, false),
    };
    let score = match raw {
        "-inf" => f64::NEG_INFINITY,
        "+inf" | "inf" => f64::INFINITY,
        other => other.parse().unwrap_or(f64::NAN),
    };
    (score, exclusive)
}

fn apply(data: &mut MockData, args: &[String]) -> String {
    let name = args[0].to_ascii_uppercase();
    match name.as_str() {
        "CLIENT" | "HELLO" | "SELECT" => "+OK\r\n".to_string(),
        "PING" => "+PONG\r\n".to_string(),
        "GET" => match data.strings.get(&args[1]) {
            Some(value) => format!("${}\r\n{}\r\n", value.len(), value),
            None => "$-1\r\n".to_string(),
        },
        "SET" => {
            data.strings.insert(args[1].clone(), args[2].clone());
            "+OK\r\n".to_string()
        }
        "DEL" => {
            let removed = args[1..]
                .iter()
                .filter(|key| {
                    let string = data.strings.remove(*key).is_some();
                    let zset = data.zsets.remove(*key).is_some();
                    string || zset
                })
                .count();
            format!(":{removed}\r\n")
        }
        "ZADD" => {
            let score = parse_score(&args[2]).0;
            let set = data.zsets.entry(args[1].clone()).or_default();
            let added = set.insert(args[3].clone(), score).is_none();
            format!(":{}\r\n", u8::from(added))
        }
        "ZREMRANGEBYSCORE" => {
            let (min, min_exclusive) = parse_score(&args[2]);
            let (max, max_exclusive) = parse_score(&args[3]);
            let set = data.zsets.entry(args[1].clone()).or_default();
            let before = set.len();
            set.retain(|_, score| {
                let above_min = if min_exclusive { *score > min } else { *score >= min };
                let below_max = if max_exclusive { *score < max } else { *score <= max };
                !(above_min && below_max)
            });
            format!(":{}\r\n", before - set.len())
        }
        "ZCARD" => {
            let count = data.zsets.get(&args[1]).map_or(0, HashMap::len);
            format!(":{count}\r\n")
        }
        "EXPIRE" => {
            let exists = data.zsets.contains_key(&args[1]) || data.strings.contains_key(&args[1]);
            format!(":{}\r\n", u8::from(exists))
        }
        other => format!("-ERR unknown command '{other}'\r\n"),
    }
}
