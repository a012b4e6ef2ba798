//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ttl/cooldown > 0, percentage <= 100)
//! - Detect event types claimed by both enforcing and dry-run lists
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Runs before a board is built, so bad values never reach traffic

use std::collections::HashSet;
use thiserror::Error;

use crate::config::schema::{AppConfig, BreakerConfig, FailureThreshold, StoreConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("breaker.ttl_seconds must be greater than 0")]
    ZeroTtl,

    #[error("breaker.cooldown_seconds must be greater than 0")]
    ZeroCooldown,

    #[error("breaker.failure_threshold percentage {0} is outside 0..=100")]
    PercentageOutOfRange(u32),

    #[error("breaker.failure_threshold absolute count must be greater than 0")]
    ZeroAbsoluteThreshold,

    #[error("event type {0:?} is listed as both enforced and dry-run")]
    ConflictingEventType(String),

    #[error("store.url must not be empty")]
    EmptyStoreUrl,

    #[error("store.timeout_ms must be greater than 0")]
    ZeroStoreTimeout,
}

/// Validate the breaker section.
pub fn validate_breaker(config: &BreakerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.ttl_seconds == 0 {
        errors.push(ValidationError::ZeroTtl);
    }
    if config.cooldown_seconds == 0 {
        errors.push(ValidationError::ZeroCooldown);
    }
    match config.failure_threshold {
        FailureThreshold::Percentage(pct) if pct > 100 => {
            errors.push(ValidationError::PercentageOutOfRange(pct));
        }
        FailureThreshold::Absolute(0) => errors.push(ValidationError::ZeroAbsoluteThreshold),
        _ => {}
    }

    let enforced: HashSet<&str> = config.event_types.iter().map(String::as_str).collect();
    for event_type in &config.dry_run_event_types {
        if enforced.contains(event_type.as_str()) {
            errors.push(ValidationError::ConflictingEventType(event_type.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a whole configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = validate_breaker(&config.breaker).err().unwrap_or_default();

    if let StoreConfig::Redis {
        url, timeout_ms, ..
    } = &config.store
    {
        if url.trim().is_empty() {
            errors.push(ValidationError::EmptyStoreUrl);
        }
        if *timeout_ms == 0 {
            errors.push(ValidationError::ZeroStoreTimeout);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = AppConfig::default();
        config.breaker.ttl_seconds = 0;
        config.breaker.cooldown_seconds = 0;
        config.breaker.failure_threshold = FailureThreshold::Percentage(101);
        config.store = StoreConfig::Redis {
            url: " ".to_string(),
            timeout_ms: 0,
            key_prefix: "breaker_board".to_string(),
        };

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroTtl,
                ValidationError::ZeroCooldown,
                ValidationError::PercentageOutOfRange(101),
                ValidationError::EmptyStoreUrl,
                ValidationError::ZeroStoreTimeout,
            ]
        );
    }

    #[test]
    fn test_percentage_bounds_are_inclusive() {
        let mut config = BreakerConfig::default();
        config.failure_threshold = FailureThreshold::Percentage(0);
        assert!(validate_breaker(&config).is_ok());
        config.failure_threshold = FailureThreshold::Percentage(100);
        assert!(validate_breaker(&config).is_ok());
        config.failure_threshold = FailureThreshold::Absolute(0);
        assert_eq!(
            validate_breaker(&config).unwrap_err(),
            vec![ValidationError::ZeroAbsoluteThreshold]
        );
    }

    #[test]
    fn test_conflicting_event_types() {
        let mut config = BreakerConfig::default();
        config.event_types = vec!["checkout_calculate_taxes".to_string()];
        config.dry_run_event_types = vec!["checkout_calculate_taxes".to_string()];

        assert_eq!(
            validate_breaker(&config).unwrap_err(),
            vec![ValidationError::ConflictingEventType(
                "checkout_calculate_taxes".to_string()
            )]
        );
    }
}
