//! # Resilience Module
//!
//! Fault isolation for a single unreliable downstream call.
//!
//! ## Architecture
//!
//! - **Circuit Breaker**: context object that gates calls and owns the state
//! - **States**: Healthy, Broken and Probing, each reacting to call notifications
//! - **Listeners**: synchronous hooks for before-call, after-success and on-failure
//! - **Clock**: injectable time source for cooldown checks
//!
//! ## Usage
//!
//! ```rust
//! use circuit_guard::resilience::{BreakerConfig, CircuitBreaker};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BreakerConfig {
//!     failure_threshold: 3,
//!     cooldown: Duration::from_millis(400),
//! };
//! let breaker = CircuitBreaker::new("inventory_api", config)?;
//!
//! let breaker = breaker.guarded_call(|| {
//!     // Remote call here
//!     Err::<(), _>(std::io::Error::other("connection refused"))
//! });
//!
//! assert!(breaker.is_healthy());
//! assert_eq!(breaker.failure_count(), 1);
//! assert!(breaker.last_failure().is_some());
//! # Ok(())
//! # }
//! ```

pub mod circuit_breaker;
pub mod clock;
pub mod config;
pub mod failure;
pub mod listeners;
pub mod state;
pub mod status;

pub use circuit_breaker::{CallOutcome, CircuitBreaker};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::BreakerConfig;
pub use failure::OperationFailure;
pub use listeners::{ListenerId, Notification};
pub use state::CircuitState;
pub use status::{BreakerStatus, CallStats};
