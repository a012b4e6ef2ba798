//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → store::from_config + BreakerBoard::new
//! ```
//!
//! # Design Decisions
//! - Config is immutable once a board is built from it
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{AppConfig, BreakerConfig, FailureThreshold, ObservabilityConfig, StoreConfig};
pub use validation::{validate_breaker, validate_config, ValidationError};
