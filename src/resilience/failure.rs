//! Captured failures of a guarded operation.

use chrono::{DateTime, Utc};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// The most recent failure observed by a breaker
///
/// Cloning is cheap: the underlying error is shared, so the same record can
/// be handed to listeners and to [`last_failure`](crate::CircuitBreaker::last_failure)
/// callers.
#[derive(Debug, Clone)]
pub struct OperationFailure {
    error: Arc<anyhow::Error>,
    failed_at: DateTime<Utc>,
    ordinal: u64,
}

impl OperationFailure {
    pub(crate) fn new(error: anyhow::Error, ordinal: u64) -> Self {
        Self {
            error: Arc::new(error),
            failed_at: Utc::now(),
            ordinal,
        }
    }

    /// Turn a caught panic payload into an error
    pub(crate) fn panic_error(payload: Box<dyn Any + Send>) -> anyhow::Error {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "non-string panic payload".to_string()
        };
        anyhow::anyhow!("operation panicked: {message}")
    }

    /// The error returned by the operation
    pub fn error(&self) -> &anyhow::Error {
        &self.error
    }

    /// Attempt to view the failure as a concrete error type
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.error.downcast_ref::<E>()
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }

    pub fn failed_at(&self) -> DateTime<Utc> {
        self.failed_at
    }

    /// Position of this failure among all failures the breaker has recorded (1-based)
    pub fn ordinal(&self) -> u64 {
        self.ordinal
    }
}

impl fmt::Display for OperationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failure #{}: {}", self.ordinal, self.error)
    }
}
