//! # Circuit Breaker Configuration
//!
//! Validated parameters for a single breaker. File and environment driven
//! settings live in [`crate::config`] and convert into [`BreakerConfig`].

use crate::error::{CircuitGuardError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a single circuit breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Number of consecutive failures before opening circuit
    pub failure_threshold: u32,

    /// Minimum time the circuit stays open before a probe is allowed
    pub cooldown: Duration,
}

impl BreakerConfig {
    /// Build and validate a configuration in one step
    pub fn new(failure_threshold: u32, cooldown: Duration) -> Result<Self> {
        let config = Self {
            failure_threshold,
            cooldown,
        };
        config.validate()?;
        Ok(config)
    }

    /// Create configuration for database operations
    pub fn for_database() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_secs(30),
        }
    }

    /// Create configuration for queue operations
    pub fn for_queue() -> Self {
        Self {
            failure_threshold: 3,
            cooldown: Duration::from_secs(15),
        }
    }

    /// Create configuration for external API calls
    pub fn for_external_api() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_secs(45),
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.failure_threshold == 0 {
            return Err(CircuitGuardError::invalid_configuration(
                "failure_threshold",
                self.failure_threshold,
                "must be greater than 0",
            ));
        }

        if self.cooldown.is_zero() {
            return Err(CircuitGuardError::invalid_configuration(
                "cooldown",
                format!("{}ms", self.cooldown.as_millis()),
                "must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breaker_config_validation() {
        // Valid config should pass
        let valid_config = BreakerConfig::default();
        assert!(valid_config.validate().is_ok());

        // Invalid failure threshold
        let mut invalid_config = BreakerConfig {
            failure_threshold: 0,
            ..Default::default()
        };
        assert!(invalid_config.validate().is_err());

        // Invalid cooldown
        invalid_config = BreakerConfig {
            cooldown: Duration::ZERO,
            ..Default::default()
        };
        let err = invalid_config.validate().unwrap_err();
        assert!(err.is_invalid_configuration());
        assert!(err.to_string().contains("cooldown"));
    }

    #[test]
    fn test_new_rejects_zero_threshold() {
        let result = BreakerConfig::new(0, Duration::from_millis(400));
        assert!(matches!(
            result,
            Err(CircuitGuardError::InvalidConfiguration { ref field, .. }) if field == "failure_threshold"
        ));

        let config = BreakerConfig::new(3, Duration::from_millis(400)).unwrap();
        assert_eq!(config.failure_threshold, 3);
    }

    #[test]
    fn test_preset_configurations() {
        let db_config = BreakerConfig::for_database();
        assert_eq!(db_config.failure_threshold, 5);
        assert!(db_config.validate().is_ok());

        let queue_config = BreakerConfig::for_queue();
        assert_eq!(queue_config.failure_threshold, 3);
        assert!(queue_config.validate().is_ok());

        let api_config = BreakerConfig::for_external_api();
        assert_eq!(api_config.cooldown, Duration::from_secs(45));
        assert!(api_config.validate().is_ok());
    }
}
