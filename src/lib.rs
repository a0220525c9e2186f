#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Circuit Guard
//!
//! Fault-isolating call guard for clients of unreliable downstream resources.
//!
//! ## Overview
//!
//! A [`CircuitBreaker`] wraps a no-argument operation. While the operation
//! keeps failing the breaker counts failures; once the configured threshold is
//! reached it stops running the operation at all and rejects calls until a
//! cooldown has elapsed. The first call after the cooldown is a probe: success
//! restores normal operation, failure breaks the circuit again.
//!
//! ```text
//!            failures >= threshold
//!   Healthy ───────────────────────▶ Broken
//!      ▲                            │   ▲
//!      │ probe succeeds    cooldown │   │ probe fails
//!      │                   elapsed  ▼   │
//!      └──────────────────────── Probing
//! ```
//!
//! Operation failures are never returned to the caller of
//! [`CircuitBreaker::guarded_call`]; they are recorded and can be inspected
//! through [`CircuitBreaker::last_failure`] and the state predicates.
//!
//! ## Module Organization
//!
//! - [`resilience`] - Breaker, states, listeners and status snapshots
//! - [`config`] - File and environment driven settings
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust
//! use circuit_guard::CircuitBreaker;
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let breaker = CircuitBreaker::with_threshold(3, Duration::from_millis(400))?;
//!
//! for _ in 0..3 {
//!     breaker.guarded_call(|| Err::<(), _>(anyhow::anyhow!("database unavailable")));
//! }
//!
//! assert!(breaker.is_broken());
//! assert!(breaker.threshold_reached());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod resilience;
pub mod test_utils;

pub use config::{BreakerSettings, ConfigLoader, GuardSettings};
pub use error::{CircuitGuardError, Result};
pub use resilience::{
    BreakerConfig, BreakerStatus, CallOutcome, CallStats, CircuitBreaker, CircuitState, Clock,
    ListenerId, ManualClock, Notification, OperationFailure, SystemClock,
};
