//! Lifecycle flags and their transitions.
//!
//! Every transition is a pure function from the old state to the new one, so
//! the state machine can be exercised without a device.

use super::history::ConfigSnapshot;

/// Bookkeeping for the emulated candidate/commit cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleState {
    /// Content was pushed since the last commit or rollback
    pub changed: bool,
    /// Last terminal operation was a successful commit or rollback
    pub committed: bool,
    /// Snapshot the device should match when nothing is pending
    pub last_working: ConfigSnapshot,
}

impl LifecycleState {
    pub fn new(initial: ConfigSnapshot) -> Self {
        Self {
            changed: false,
            committed: false,
            last_working: initial,
        }
    }

    /// A candidate was pushed completely
    pub fn after_load(&self) -> Self {
        Self {
            changed: true,
            committed: false,
            last_working: self.last_working.clone(),
        }
    }

    /// A candidate push failed. Whatever the compensating discard achieved,
    /// nothing counts as pending and the last operation did not commit.
    pub fn after_failed_load(&self) -> Self {
        Self {
            changed: false,
            committed: false,
            last_working: self.last_working.clone(),
        }
    }

    /// The running configuration was recorded as a new checkpoint
    pub fn after_commit(&self, snapshot: ConfigSnapshot) -> Self {
        Self {
            changed: false,
            committed: true,
            last_working: snapshot,
        }
    }

    /// A commit found the running configuration equal to `last_working`
    pub fn after_empty_commit(&self) -> Self {
        Self {
            changed: false,
            committed: self.committed,
            last_working: self.last_working.clone(),
        }
    }

    /// The device was moved back to `target`
    pub fn after_rollback(&self, target: ConfigSnapshot) -> Self {
        Self {
            changed: false,
            committed: true,
            last_working: target,
        }
    }
}
