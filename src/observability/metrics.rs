//! Breaker metrics.
//!
//! # Metrics
//! - `breaker_calls_total` (counter): classified calls by event type, outcome
//! - `breaker_short_circuits_total` (counter): calls refused while open
//! - `breaker_trips_total` (counter): closed → open transitions
//! - `breaker_resets_total` (counter): explicit closes after cooldown
//! - `breaker_store_errors_total` (counter): swallowed store failures by op

/// Record the classification of a forwarded call.
pub fn record_call(event_type: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    ::metrics::counter!(
        "breaker_calls_total",
        "event_type" => event_type.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a call refused by an open breaker.
pub fn record_short_circuit(event_type: &str) {
    ::metrics::counter!("breaker_short_circuits_total", "event_type" => event_type.to_string())
        .increment(1);
}

pub fn record_trip() {
    ::metrics::counter!("breaker_trips_total").increment(1);
}

pub fn record_reset() {
    ::metrics::counter!("breaker_resets_total").increment(1);
}

/// Record a store failure that was converted into a fail-open default.
pub fn record_store_error(op: &'static str) {
    ::metrics::counter!("breaker_store_errors_total", "op" => op).increment(1);
}
