//! # Configuration Management
//!
//! File and environment driven breaker settings.
//!
//! ```text
//! circuit-guard.toml                 (base, optional)
//!     → circuit-guard.{env}.toml     (environment overlay, optional)
//!     → CIRCUIT_GUARD__* variables   (highest precedence)
//!     → GuardSettings                (validated)
//!     → BreakerConfig per component
//! ```
//!
//! Raw values are signed so that negative input from files or the
//! environment is reported as an invalid configuration instead of a parse
//! failure.

pub mod loader;

pub use loader::ConfigLoader;

use crate::error::{CircuitGuardError, Result};
use crate::resilience::{BreakerConfig, CircuitBreaker};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Breaker parameters as they appear in configuration sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerSettings {
    pub failure_threshold: i64,
    pub cooldown_ms: i64,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown_ms: 30_000,
        }
    }
}

impl BreakerSettings {
    /// Convert to a validated [`BreakerConfig`]
    pub fn to_breaker_config(&self) -> Result<BreakerConfig> {
        if self.failure_threshold <= 0 {
            return Err(CircuitGuardError::invalid_configuration(
                "failure_threshold",
                self.failure_threshold,
                "must be greater than 0",
            ));
        }
        let failure_threshold = u32::try_from(self.failure_threshold).map_err(|_| {
            CircuitGuardError::invalid_configuration(
                "failure_threshold",
                self.failure_threshold,
                format!("must not exceed {}", u32::MAX),
            )
        })?;

        if self.cooldown_ms <= 0 {
            return Err(CircuitGuardError::invalid_configuration(
                "cooldown_ms",
                self.cooldown_ms,
                "must be greater than 0",
            ));
        }

        BreakerConfig::new(
            failure_threshold,
            Duration::from_millis(self.cooldown_ms as u64),
        )
    }
}

/// Settings for every breaker an application builds
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GuardSettings {
    /// Used for components without their own entry
    pub default: BreakerSettings,

    /// Per-component overrides keyed by component name
    pub components: HashMap<String, BreakerSettings>,
}

impl GuardSettings {
    /// Get settings for a specific component
    pub fn settings_for_component(&self, component: &str) -> BreakerSettings {
        self.components
            .get(component)
            .copied()
            .unwrap_or(self.default)
    }

    /// Resolve and validate the breaker configuration for a component
    pub fn config_for_component(&self, component: &str) -> Result<BreakerConfig> {
        self.settings_for_component(component).to_breaker_config()
    }

    /// Build a named breaker for `component`
    pub fn build_breaker(&self, component: &str) -> Result<CircuitBreaker> {
        CircuitBreaker::new(component, self.config_for_component(component)?)
    }

    /// Validate the default and every component entry
    pub fn validate(&self) -> Result<()> {
        self.default.to_breaker_config()?;
        for (component, settings) in &self.components {
            settings.to_breaker_config().map_err(|err| match err {
                CircuitGuardError::InvalidConfiguration {
                    field,
                    value,
                    reason,
                } => CircuitGuardError::InvalidConfiguration {
                    field: format!("components.{component}.{field}"),
                    value,
                    reason,
                },
                other => other,
            })?;
        }
        Ok(())
    }
}
