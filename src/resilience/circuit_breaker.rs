//! # Circuit Breaker Implementation
//!
//! Guards a single downstream operation. Failures are counted while healthy;
//! once the threshold is reached the circuit breaks and calls are rejected
//! until the cooldown has elapsed, at which point the next call is let through
//! as a probe.
//!
//! Bookkeeping (state, failure count, last failure, listeners) lives behind one
//! mutex. The lock is taken twice per call, once for the gate and once for the
//! outcome, and is never held while the caller's operation runs.

use crate::error::Result;
use crate::logging::log_breaker_transition;
use crate::resilience::listeners::{Listener, ListenerRegistry};
use crate::resilience::state::{BreakerState, FailureLedger, StateContext};
use crate::resilience::{
    BreakerConfig, BreakerStatus, CallStats, CircuitState, Clock, ListenerId, Notification,
    OperationFailure, SystemClock,
};
use futures::FutureExt;
use parking_lot::Mutex;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Result of a single guarded call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// The operation ran and completed without error
    Succeeded,
    /// The operation ran and failed; the failure was recorded
    Failed,
    /// The circuit was broken; the operation was not attempted
    Rejected,
}

impl CallOutcome {
    pub fn is_success(self) -> bool {
        self == CallOutcome::Succeeded
    }

    pub fn is_rejected(self) -> bool {
        self == CallOutcome::Rejected
    }
}

#[derive(Debug)]
struct BreakerInner {
    state: BreakerState,
    ledger: FailureLedger,
    last_failure: Option<OperationFailure>,
    calls: CallStats,
    listeners: ListenerRegistry,
}

/// Three-state circuit breaker guarding one operation
pub struct CircuitBreaker {
    /// Component name for logging
    name: String,

    /// Configuration parameters
    config: BreakerConfig,

    clock: Arc<dyn Clock>,

    inner: Mutex<BreakerInner>,
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("state", &inner.state.kind())
            .field("failure_count", &inner.ledger.count())
            .field("listeners", &inner.listeners)
            .finish()
    }
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given name and configuration
    pub fn new(name: impl Into<String>, config: BreakerConfig) -> Result<Self> {
        Self::with_clock(name, config, Arc::new(SystemClock))
    }

    /// Create an unnamed breaker from a bare threshold and cooldown
    pub fn with_threshold(failure_threshold: u32, cooldown: Duration) -> Result<Self> {
        Self::new(
            "circuit_breaker",
            BreakerConfig {
                failure_threshold,
                cooldown,
            },
        )
    }

    /// Create a breaker that reads time from `clock`
    pub fn with_clock(
        name: impl Into<String>,
        config: BreakerConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let name = name.into();

        let mut ledger = FailureLedger::new(config.failure_threshold);
        let state = BreakerState::enter(
            CircuitState::Healthy,
            &mut StateContext {
                ledger: &mut ledger,
                cooldown: config.cooldown,
                now: clock.now(),
            },
        );

        info!(
            component = %name,
            failure_threshold = config.failure_threshold,
            cooldown_ms = config.cooldown.as_millis() as u64,
            "Circuit breaker initialized"
        );

        Ok(Self {
            name,
            config,
            clock,
            inner: Mutex::new(BreakerInner {
                state,
                ledger,
                last_failure: None,
                calls: CallStats::default(),
                listeners: ListenerRegistry::default(),
            }),
        })
    }

    /// Run `operation` unless the circuit is broken
    ///
    /// Errors and panics from the operation are captured and never returned;
    /// inspect the breaker afterwards (`last_failure`, `is_broken`, ...).
    pub fn guarded_call<F, E>(&self, operation: F) -> &Self
    where
        F: FnOnce() -> std::result::Result<(), E>,
        E: Into<anyhow::Error>,
    {
        self.attempt(operation);
        self
    }

    /// Like [`guarded_call`](Self::guarded_call) but reports what happened
    pub fn attempt<F, E>(&self, operation: F) -> CallOutcome
    where
        F: FnOnce() -> std::result::Result<(), E>,
        E: Into<anyhow::Error>,
    {
        if !self.admit() {
            return CallOutcome::Rejected;
        }

        let result = panic::catch_unwind(AssertUnwindSafe(operation));
        self.complete(Self::capture_failure(result))
    }

    /// Async variant of [`guarded_call`](Self::guarded_call); the lock is never held across `.await`
    pub async fn guarded_call_async<F, Fut, E>(&self, operation: F) -> &Self
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<(), E>>,
        E: Into<anyhow::Error>,
    {
        self.attempt_async(operation).await;
        self
    }

    /// Async variant of [`attempt`](Self::attempt)
    pub async fn attempt_async<F, Fut, E>(&self, operation: F) -> CallOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<(), E>>,
        E: Into<anyhow::Error>,
    {
        if !self.admit() {
            return CallOutcome::Rejected;
        }

        let result = AssertUnwindSafe(async move { operation().await })
            .catch_unwind()
            .await;
        self.complete(Self::capture_failure(result))
    }

    fn capture_failure<E>(
        result: std::thread::Result<std::result::Result<(), E>>,
    ) -> Option<anyhow::Error>
    where
        E: Into<anyhow::Error>,
    {
        match result {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err.into()),
            Err(payload) => Some(OperationFailure::panic_error(payload)),
        }
    }

    /// Gate: clear the previous failure, let the state react, decide
    fn admit(&self) -> bool {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let now = self.clock.now();

        inner.last_failure = None;
        inner.calls.attempts += 1;

        self.react(inner, Notification::BeforeCall, now);
        self.fire(inner, Notification::BeforeCall, now);

        if inner.state.kind() == CircuitState::Broken {
            inner.calls.rejections += 1;
            debug!(
                component = %self.name,
                failure_count = inner.ledger.count(),
                "Call rejected (circuit broken)"
            );
            return false;
        }

        true
    }

    /// Record the outcome of an admitted call
    fn complete(&self, failure: Option<anyhow::Error>) -> CallOutcome {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let now = self.clock.now();

        match failure {
            None => {
                inner.calls.successes += 1;
                debug!(component = %self.name, state = %inner.state.kind(), "Operation succeeded");

                self.react(inner, Notification::AfterSuccess, now);
                self.fire(inner, Notification::AfterSuccess, now);
                CallOutcome::Succeeded
            }
            Some(err) => {
                inner.calls.failures += 1;
                let failure = OperationFailure::new(err, inner.calls.failures);
                error!(
                    component = %self.name,
                    state = %inner.state.kind(),
                    error = %failure.error(),
                    "Operation failed"
                );
                inner.last_failure = Some(failure);

                self.react(inner, Notification::OnFailure, now);
                self.fire(inner, Notification::OnFailure, now);
                CallOutcome::Failed
            }
        }
    }

    /// Deliver a notification to the installed state and apply any transition it asks for
    fn react(&self, inner: &mut BreakerInner, notification: Notification, now: Instant) {
        let mut ctx = StateContext {
            ledger: &mut inner.ledger,
            cooldown: self.config.cooldown,
            now,
        };
        let behavior = inner.state.behavior();
        let next = match notification {
            Notification::BeforeCall => behavior.on_before_call(&mut ctx),
            Notification::AfterSuccess => behavior.on_success(&mut ctx),
            Notification::OnFailure => behavior.on_failure(&mut ctx),
        };

        if let Some(target) = next {
            self.transition_to(inner, target, now);
        }
    }

    fn transition_to(&self, inner: &mut BreakerInner, target: CircuitState, now: Instant) {
        let from = inner.state.kind();
        inner.state = BreakerState::enter(
            target,
            &mut StateContext {
                ledger: &mut inner.ledger,
                cooldown: self.config.cooldown,
                now,
            },
        );

        log_breaker_transition(
            &self.name,
            from,
            target,
            inner.ledger.count(),
            self.config.failure_threshold,
            self.config.cooldown,
        );
    }

    fn fire(&self, inner: &BreakerInner, notification: Notification, now: Instant) {
        if inner.listeners.has_any(notification) {
            let status = self.snapshot(inner, now);
            inner.listeners.notify(notification, &status);
        }
    }

    fn snapshot(&self, inner: &BreakerInner, now: Instant) -> BreakerStatus {
        BreakerStatus {
            name: self.name.clone(),
            state: inner.state.kind(),
            failure_count: inner.ledger.count(),
            failure_threshold: inner.ledger.threshold(),
            threshold_reached: inner.ledger.threshold_reached(),
            cooldown: self.config.cooldown,
            remaining_cooldown: inner
                .state
                .as_broken()
                .map(|broken| broken.remaining_cooldown(self.config.cooldown, now)),
            last_failure: inner.last_failure.as_ref().map(OperationFailure::message),
            last_failure_at: inner.last_failure.as_ref().map(OperationFailure::failed_at),
            calls: inner.calls,
        }
    }

    /// Get current circuit state
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state.kind()
    }

    pub fn is_healthy(&self) -> bool {
        self.state() == CircuitState::Healthy
    }

    pub fn is_broken(&self) -> bool {
        self.state() == CircuitState::Broken
    }

    pub fn is_probing(&self) -> bool {
        self.state() == CircuitState::Probing
    }

    /// Failures accumulated since the breaker last became healthy
    pub fn failure_count(&self) -> u32 {
        self.inner.lock().ledger.count()
    }

    pub fn threshold_reached(&self) -> bool {
        self.inner.lock().ledger.threshold_reached()
    }

    /// Failure captured by the most recent call attempt, if it failed
    pub fn last_failure(&self) -> Option<OperationFailure> {
        self.inner.lock().last_failure.clone()
    }

    pub fn failure_threshold(&self) -> u32 {
        self.config.failure_threshold
    }

    pub fn cooldown(&self) -> Duration {
        self.config.cooldown
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Get component name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a consistent snapshot of the breaker
    pub fn status(&self) -> BreakerStatus {
        let inner = self.inner.lock();
        self.snapshot(&inner, self.clock.now())
    }

    /// Attach a listener to one notification point
    pub fn add_listener<F>(&self, notification: Notification, listener: F) -> ListenerId
    where
        F: Fn(&BreakerStatus) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        self.inner.lock().listeners.add(notification, listener)
    }

    pub fn on_before_call<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&BreakerStatus) + Send + Sync + 'static,
    {
        self.add_listener(Notification::BeforeCall, listener)
    }

    pub fn on_after_success<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&BreakerStatus) + Send + Sync + 'static,
    {
        self.add_listener(Notification::AfterSuccess, listener)
    }

    pub fn on_failure<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&BreakerStatus) + Send + Sync + 'static,
    {
        self.add_listener(Notification::OnFailure, listener)
    }

    /// Detach a listener; returns false if it was already gone
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.lock().listeners.remove(id)
    }

    /// Force circuit to broken state (for emergency situations)
    pub fn force_open(&self) {
        warn!(component = %self.name, "Circuit breaker forced open");
        let mut guard = self.inner.lock();
        self.transition_to(&mut guard, CircuitState::Broken, self.clock.now());
    }

    /// Force circuit to healthy state (for emergency recovery)
    pub fn force_closed(&self) {
        warn!(component = %self.name, "Circuit breaker forced closed");
        let mut guard = self.inner.lock();
        self.transition_to(&mut guard, CircuitState::Healthy, self.clock.now());
    }
}
