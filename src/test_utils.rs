//! Test helpers shared by unit and integration tests.

use std::sync::atomic::{AtomicU64, Ordering};

/// Stand-in for a downstream dependency that records how often it was invoked
#[derive(Debug, Default)]
pub struct CallProbe {
    successes: AtomicU64,
    failures: AtomicU64,
}

impl CallProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invocation that completes normally
    pub fn succeed(&self) -> anyhow::Result<()> {
        self.successes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Invocation that fails with an error
    pub fn fail(&self) -> anyhow::Result<()> {
        let attempt = self.failures.fetch_add(1, Ordering::SeqCst) + 1;
        Err(anyhow::anyhow!("Failed with error (attempt {attempt})"))
    }

    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::SeqCst)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::SeqCst)
    }

    /// Total number of times the dependency actually ran
    pub fn invocations(&self) -> u64 {
        self.successes() + self.failures()
    }
}
