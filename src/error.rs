//! # Error Types
//!
//! Errors surfaced synchronously by the guard. Failures of the guarded
//! operation are *not* represented here: they are captured as
//! [`OperationFailure`](crate::resilience::OperationFailure) records and
//! absorbed by the breaker.

use thiserror::Error;

/// Errors raised while building a breaker or loading its settings
#[derive(Debug, Error)]
pub enum CircuitGuardError {
    /// A threshold or cooldown outside its valid range
    #[error("Invalid configuration value '{value}' for field '{field}': {reason}")]
    InvalidConfiguration {
        field: String,
        value: String,
        reason: String,
    },

    /// Settings sources could not be read or deserialized
    #[error("Failed to load configuration: {source}")]
    ConfigLoad {
        #[from]
        source: config::ConfigError,
    },
}

impl CircuitGuardError {
    /// Create an invalid configuration error
    pub fn invalid_configuration<F, V, R>(field: F, value: V, reason: R) -> Self
    where
        F: Into<String>,
        V: ToString,
        R: Into<String>,
    {
        Self::InvalidConfiguration {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error came from validating a configuration value
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration { .. })
    }
}

pub type Result<T> = std::result::Result<T, CircuitGuardError>;
