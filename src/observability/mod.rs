//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! store / engine / board produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters via the metrics facade)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Whatever metrics recorder the host process installs
//! ```
//!
//! # Design Decisions
//! - Store failures are always logged; they are otherwise invisible
//! - Metrics are cheap no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
