//! Synchronous listeners for the three call notification points.
//!
//! Listeners run on the calling thread while the breaker's lock is held, in
//! registration order. They receive a [`BreakerStatus`] snapshot instead of
//! the breaker itself: calling back into the same breaker from a listener
//! would deadlock.

use crate::resilience::BreakerStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Notification points fired by every guarded call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notification {
    /// Before the gate decides whether the operation runs
    BeforeCall,
    /// After the operation completed without error
    AfterSuccess,
    /// After the operation failed
    OnFailure,
}

/// Handle returned on registration, used to detach a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener = Arc<dyn Fn(&BreakerStatus) + Send + Sync>;

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: u64,
    entries: Vec<(ListenerId, Notification, Listener)>,
}

impl ListenerRegistry {
    pub(crate) fn add(&mut self, notification: Notification, listener: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.entries.push((id, notification, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn has_any(&self, notification: Notification) -> bool {
        self.entries
            .iter()
            .any(|(_, kind, _)| *kind == notification)
    }

    pub(crate) fn count(&self, notification: Notification) -> usize {
        self.entries
            .iter()
            .filter(|(_, kind, _)| *kind == notification)
            .count()
    }

    pub(crate) fn notify(&self, notification: Notification, status: &BreakerStatus) {
        for (_, kind, listener) in &self.entries {
            if *kind == notification {
                listener(status);
            }
        }
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("before_call", &self.count(Notification::BeforeCall))
            .field("after_success", &self.count(Notification::AfterSuccess))
            .field("on_failure", &self.count(Notification::OnFailure))
            .finish()
    }
}
