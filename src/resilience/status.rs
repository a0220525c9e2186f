//! # Breaker Status
//!
//! Point-in-time snapshot of a breaker, handed to listeners and returned by
//! [`CircuitBreaker::status`](crate::CircuitBreaker::status). Counters are
//! per breaker instance; nothing is aggregated across breakers.

use crate::resilience::CircuitState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Call counters for a single breaker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallStats {
    /// Calls that reached the gate
    pub attempts: u64,

    /// Operations that completed without error
    pub successes: u64,

    /// Operations that returned an error or panicked
    pub failures: u64,

    /// Calls refused because the circuit was broken
    pub rejections: u64,
}

/// Snapshot of a breaker's queryable state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerStatus {
    pub name: String,
    pub state: CircuitState,
    pub failure_count: u32,
    pub failure_threshold: u32,
    pub threshold_reached: bool,
    pub cooldown: Duration,

    /// Time left before a probe is allowed; only set while broken
    pub remaining_cooldown: Option<Duration>,

    /// Message of the failure captured by the current call attempt
    pub last_failure: Option<String>,
    pub last_failure_at: Option<DateTime<Utc>>,

    pub calls: CallStats,
}

impl BreakerStatus {
    pub fn is_healthy(&self) -> bool {
        self.state == CircuitState::Healthy
    }

    pub fn is_broken(&self) -> bool {
        self.state == CircuitState::Broken
    }

    pub fn is_probing(&self) -> bool {
        self.state == CircuitState::Probing
    }

    /// Format status for logging
    pub fn format_summary(&self) -> String {
        format!(
            "{} | State: {} | Failures: {}/{} | Calls: {} | Rejected: {}",
            self.name,
            self.state.description(),
            self.failure_count,
            self.failure_threshold,
            self.calls.attempts,
            self.calls.rejections
        )
    }

    /// JSON representation for diagnostics endpoints and structured logs
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "state": self.state,
            "failure_count": self.failure_count,
            "failure_threshold": self.failure_threshold,
            "threshold_reached": self.threshold_reached,
            "cooldown_ms": self.cooldown.as_millis() as u64,
            "remaining_cooldown_ms": self.remaining_cooldown.map(|d| d.as_millis() as u64),
            "last_failure": self.last_failure,
            "last_failure_at": self.last_failure_at.map(|at| at.to_rfc3339()),
            "calls": self.calls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broken_status() -> BreakerStatus {
        BreakerStatus {
            name: "database".to_string(),
            state: CircuitState::Broken,
            failure_count: 3,
            failure_threshold: 3,
            threshold_reached: true,
            cooldown: Duration::from_millis(400),
            remaining_cooldown: Some(Duration::from_millis(150)),
            last_failure: None,
            last_failure_at: None,
            calls: CallStats {
                attempts: 4,
                successes: 0,
                failures: 3,
                rejections: 1,
            },
        }
    }

    #[test]
    fn test_state_predicates() {
        let status = broken_status();
        assert!(status.is_broken());
        assert!(!status.is_healthy());
        assert!(!status.is_probing());
    }

    #[test]
    fn test_format_summary() {
        assert_eq!(
            broken_status().format_summary(),
            "database | State: Broken - Rejecting all calls | Failures: 3/3 | Calls: 4 | Rejected: 1"
        );
    }

    #[test]
    fn test_json_uses_millis() {
        let json = broken_status().to_json();
        assert_eq!(json["state"], "broken");
        assert_eq!(json["cooldown_ms"], 400);
        assert_eq!(json["remaining_cooldown_ms"], 150);
        assert_eq!(json["calls"]["rejections"], 1);
        assert!(json["last_failure"].is_null());
    }
}
