//! # Structured Logging Module
//!
//! Environment-aware `tracing` setup plus helpers that emit breaker records
//! with a consistent field layout.

use crate::resilience::CircuitState;
use chrono::Utc;
use std::sync::OnceLock;
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
///
/// `RUST_LOG` wins over the environment default. Set
/// `CIRCUIT_GUARD_LOG_FORMAT=json` for machine-readable output.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));
        let json = use_json_format();

        let layer = if json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_filter(filter)
                .boxed()
        };

        // A global subscriber may already be installed by the host application
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            environment = %environment,
            json = json,
            "Structured logging initialized"
        );
    });
}

/// Get current environment from environment variables
pub(crate) fn get_environment() -> String {
    std::env::var("CIRCUIT_GUARD_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

fn use_json_format() -> bool {
    std::env::var("CIRCUIT_GUARD_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Log a state transition at a level matching its severity
pub fn log_breaker_transition(
    component: &str,
    from: CircuitState,
    to: CircuitState,
    failure_count: u32,
    failure_threshold: u32,
    cooldown: Duration,
) {
    let cooldown_ms = cooldown.as_millis() as u64;
    match to {
        CircuitState::Broken => tracing::error!(
            component = %component,
            from_state = %from,
            to_state = %to,
            failure_count = failure_count,
            failure_threshold = failure_threshold,
            cooldown_ms = cooldown_ms,
            "Circuit breaker opened (failing fast)"
        ),
        CircuitState::Probing => tracing::info!(
            component = %component,
            from_state = %from,
            to_state = %to,
            failure_count = failure_count,
            "Circuit breaker probing (testing recovery)"
        ),
        CircuitState::Healthy => tracing::info!(
            component = %component,
            from_state = %from,
            to_state = %to,
            "Circuit breaker closed (recovered)"
        ),
    }
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}
