//! # Breaker States
//!
//! One case per operational mode. Each case reacts to the three call
//! notifications and may ask the breaker to move to another case; the breaker
//! builds a fresh value for the target and drops the old one.
//!
//! ```text
//! Healthy → Broken:  failure_count >= failure_threshold
//! Broken  → Probing: cooldown elapsed, observed on the next call attempt
//! Probing → Healthy: trial call succeeds
//! Probing → Broken:  trial call fails
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Circuit breaker states representing the current operational mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Closed: calls pass through
    Healthy,
    /// Open: calls are rejected without executing
    Broken,
    /// Half-open: the next call is a trial of the downstream resource
    Probing,
}

impl CircuitState {
    /// Human-readable state description
    pub fn description(self) -> &'static str {
        match self {
            CircuitState::Healthy => "Healthy - Normal operation",
            CircuitState::Broken => "Broken - Rejecting all calls",
            CircuitState::Probing => "Probing - Testing downstream recovery",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CircuitState::Healthy => "healthy",
            CircuitState::Broken => "broken",
            CircuitState::Probing => "probing",
        };
        f.write_str(name)
    }
}

/// Consecutive failure bookkeeping shared by every state
#[derive(Debug)]
pub(crate) struct FailureLedger {
    failure_count: u32,
    failure_threshold: u32,
}

impl FailureLedger {
    pub(crate) fn new(failure_threshold: u32) -> Self {
        Self {
            failure_count: 0,
            failure_threshold,
        }
    }

    pub(crate) fn count(&self) -> u32 {
        self.failure_count
    }

    pub(crate) fn threshold(&self) -> u32 {
        self.failure_threshold
    }

    pub(crate) fn reset(&mut self) {
        self.failure_count = 0;
    }

    pub(crate) fn increment(&mut self) -> u32 {
        self.failure_count = self.failure_count.saturating_add(1);
        self.failure_count
    }

    pub(crate) fn threshold_reached(&self) -> bool {
        self.failure_count >= self.failure_threshold
    }
}

/// Everything a state may read or touch while reacting to a notification
pub(crate) struct StateContext<'a> {
    pub(crate) ledger: &'a mut FailureLedger,
    pub(crate) cooldown: Duration,
    pub(crate) now: Instant,
}

/// Reactions of a single state. Unlisted notifications are no-ops.
pub(crate) trait StateBehavior {
    fn on_entry(&self, _ctx: &mut StateContext<'_>) {}

    fn on_before_call(&self, _ctx: &mut StateContext<'_>) -> Option<CircuitState> {
        None
    }

    fn on_success(&self, _ctx: &mut StateContext<'_>) -> Option<CircuitState> {
        None
    }

    fn on_failure(&self, _ctx: &mut StateContext<'_>) -> Option<CircuitState> {
        None
    }
}

#[derive(Debug)]
pub(crate) struct Healthy;

impl StateBehavior for Healthy {
    fn on_entry(&self, ctx: &mut StateContext<'_>) {
        ctx.ledger.reset();
    }

    fn on_failure(&self, ctx: &mut StateContext<'_>) -> Option<CircuitState> {
        ctx.ledger.increment();
        ctx.ledger.threshold_reached().then_some(CircuitState::Broken)
    }
}

#[derive(Debug)]
pub(crate) struct Broken {
    opened_at: Instant,
}

impl Broken {
    fn cooldown_elapsed(&self, cooldown: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.opened_at) >= cooldown
    }

    pub(crate) fn remaining_cooldown(&self, cooldown: Duration, now: Instant) -> Duration {
        cooldown.saturating_sub(now.saturating_duration_since(self.opened_at))
    }
}

impl StateBehavior for Broken {
    fn on_before_call(&self, ctx: &mut StateContext<'_>) -> Option<CircuitState> {
        self.cooldown_elapsed(ctx.cooldown, ctx.now)
            .then_some(CircuitState::Probing)
    }
}

#[derive(Debug)]
pub(crate) struct Probing;

impl StateBehavior for Probing {
    fn on_success(&self, _ctx: &mut StateContext<'_>) -> Option<CircuitState> {
        Some(CircuitState::Healthy)
    }

    fn on_failure(&self, ctx: &mut StateContext<'_>) -> Option<CircuitState> {
        ctx.ledger.increment();
        Some(CircuitState::Broken)
    }
}

/// The installed state of a breaker
#[derive(Debug)]
pub(crate) enum BreakerState {
    Healthy(Healthy),
    Broken(Broken),
    Probing(Probing),
}

impl BreakerState {
    /// Build a fresh state for `target` and run its entry action
    pub(crate) fn enter(target: CircuitState, ctx: &mut StateContext<'_>) -> Self {
        let state = match target {
            CircuitState::Healthy => BreakerState::Healthy(Healthy),
            CircuitState::Broken => BreakerState::Broken(Broken { opened_at: ctx.now }),
            CircuitState::Probing => BreakerState::Probing(Probing),
        };
        state.behavior().on_entry(ctx);
        state
    }

    pub(crate) fn kind(&self) -> CircuitState {
        match self {
            BreakerState::Healthy(_) => CircuitState::Healthy,
            BreakerState::Broken(_) => CircuitState::Broken,
            BreakerState::Probing(_) => CircuitState::Probing,
        }
    }

    pub(crate) fn behavior(&self) -> &dyn StateBehavior {
        match self {
            BreakerState::Healthy(state) => state,
            BreakerState::Broken(state) => state,
            BreakerState::Probing(state) => state,
        }
    }

    pub(crate) fn as_broken(&self) -> Option<&Broken> {
        match self {
            BreakerState::Broken(state) => Some(state),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(ledger: &mut FailureLedger, now: Instant) -> StateContext<'_> {
        StateContext {
            ledger,
            cooldown: Duration::from_millis(400),
            now,
        }
    }

    #[test]
    fn test_healthy_entry_resets_failures() {
        let mut ledger = FailureLedger::new(3);
        ledger.increment();
        ledger.increment();

        let now = Instant::now();
        let state = BreakerState::enter(CircuitState::Healthy, &mut context(&mut ledger, now));
        assert_eq!(state.kind(), CircuitState::Healthy);
        assert_eq!(ledger.count(), 0);
    }

    #[test]
    fn test_healthy_opens_at_threshold() {
        let mut ledger = FailureLedger::new(2);
        let now = Instant::now();
        let state = BreakerState::enter(CircuitState::Healthy, &mut context(&mut ledger, now));

        assert_eq!(state.behavior().on_failure(&mut context(&mut ledger, now)), None);
        assert_eq!(ledger.count(), 1);
        assert_eq!(
            state.behavior().on_failure(&mut context(&mut ledger, now)),
            Some(CircuitState::Broken)
        );
        assert_eq!(ledger.count(), 2);
        assert!(ledger.threshold_reached());
    }

    #[test]
    fn test_broken_promotes_at_exact_cooldown() {
        let mut ledger = FailureLedger::new(1);
        let opened = Instant::now();
        let state = BreakerState::enter(CircuitState::Broken, &mut context(&mut ledger, opened));
        let broken = state.as_broken().unwrap();
        assert_eq!(
            broken.remaining_cooldown(Duration::from_millis(400), opened),
            Duration::from_millis(400)
        );

        let just_before = opened + Duration::from_millis(399);
        assert_eq!(
            state.behavior().on_before_call(&mut context(&mut ledger, just_before)),
            None
        );
        assert_eq!(
            broken.remaining_cooldown(Duration::from_millis(400), just_before),
            Duration::from_millis(1)
        );

        let boundary = opened + Duration::from_millis(400);
        assert_eq!(
            state.behavior().on_before_call(&mut context(&mut ledger, boundary)),
            Some(CircuitState::Probing)
        );
    }

    #[test]
    fn test_broken_ignores_outcomes() {
        let mut ledger = FailureLedger::new(1);
        let now = Instant::now();
        let state = BreakerState::enter(CircuitState::Broken, &mut context(&mut ledger, now));

        assert_eq!(state.behavior().on_failure(&mut context(&mut ledger, now)), None);
        assert_eq!(state.behavior().on_success(&mut context(&mut ledger, now)), None);
        assert_eq!(ledger.count(), 0);
    }

    #[test]
    fn test_probing_outcomes() {
        let mut ledger = FailureLedger::new(3);
        for _ in 0..3 {
            ledger.increment();
        }
        let now = Instant::now();
        let state = BreakerState::enter(CircuitState::Probing, &mut context(&mut ledger, now));
        assert_eq!(ledger.count(), 3, "probing has no entry action");

        assert_eq!(
            state.behavior().on_success(&mut context(&mut ledger, now)),
            Some(CircuitState::Healthy)
        );
        assert_eq!(
            state.behavior().on_failure(&mut context(&mut ledger, now)),
            Some(CircuitState::Broken)
        );
        assert_eq!(ledger.count(), 4);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(CircuitState::Healthy.to_string(), "healthy");
        assert_eq!(CircuitState::Broken.to_string(), "broken");
        assert_eq!(CircuitState::Probing.to_string(), "probing");
        assert_eq!(
            serde_json::to_string(&CircuitState::Probing).unwrap(),
            "\"probing\""
        );
    }
}
