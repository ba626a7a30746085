//! Configuration checkpoints.
//!
//! [`ConfigHistory`] is append-only except for rollbacks, which cut it back
//! to the restored entry. Entry 0 and entry 1 both hold the configuration
//! captured when the manager was created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Running configuration as it existed on the device at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    content: String,
    captured_at: DateTime<Utc>,
}

impl ConfigSnapshot {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            captured_at: Utc::now(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

/// Errors from history access
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    #[error("history index {index} out of range (length {len})")]
    OutOfRange { index: usize, len: usize },
}

/// Ordered snapshots, oldest first.
///
/// The snapshot taken at construction is stored twice, so a fresh history
/// has length 2 and entry 1 is the configuration to return to when nothing
/// has been committed yet.
#[derive(Debug, Clone, Default)]
pub struct ConfigHistory {
    snapshots: Vec<ConfigSnapshot>,
}

impl ConfigHistory {
    /// Start a history with the initial snapshot recorded twice
    pub fn with_initial(snapshot: ConfigSnapshot) -> Self {
        Self {
            snapshots: vec![snapshot.clone(), snapshot],
        }
    }

    pub fn push(&mut self, snapshot: ConfigSnapshot) {
        self.snapshots.push(snapshot);
    }

    /// Drop every entry at index `len` or later
    pub fn truncate(&mut self, len: usize) {
        self.snapshots.truncate(len);
    }

    pub fn get(&self, index: usize) -> Result<&ConfigSnapshot, HistoryError> {
        self.snapshots.get(index).ok_or(HistoryError::OutOfRange {
            index,
            len: self.snapshots.len(),
        })
    }

    pub fn last(&self) -> Option<&ConfigSnapshot> {
        self.snapshots.last()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigSnapshot> {
        self.snapshots.iter()
    }
}
