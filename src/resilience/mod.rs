//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Synchronous webhook call:
//!     → board.rs (is this event type managed? is the app's breaker closed?)
//!     → wrapped call
//!     → outcome.rs (classify the returned value)
//!     → circuit_breaker.rs (count it, open or close the app's breaker)
//! ```
//!
//! # Design Decisions
//! - One breaker per app, state lives in the store, not in these types
//! - The board never becomes a new source of failure for callers
//! - Wrapping is a plain higher-order function, callers keep their signature

pub mod board;
pub mod circuit_breaker;
pub mod outcome;

pub use board::{BreakerBoard, BreakerStatus};
pub use circuit_breaker::{BreakerState, DecisionEngine};
pub use outcome::{CallOutcome, Observed};
