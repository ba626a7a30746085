//! # Configuration Lifecycle Emulation
//!
//! Netvisor applies every CLI command immediately and keeps no candidate or
//! rollback configuration. This module fabricates both: it records the
//! running configuration at every commit and moves the switch between those
//! snapshots by replaying them line by line.
//!
//! ## Core Components
//!
//! - **[`ConfigManager`]**: load / commit / discard / rollback / compare
//! - **[`ConfigHistory`]**: ordered snapshots, the initial one stored twice
//! - **[`LifecycleState`]**: `changed` / `committed` flags and last working snapshot
//! - **[`LifecycleError`]**: typed failures; session errors never escape unwrapped
//!
//! ## State Transitions
//!
//! ```text
//!              load_candidate
//!   clean ───────────────────────▶ dirty
//!     ▲                             │
//!     │ load failure (auto-discard) │ commit / discard / rollback
//!     └─────────────────────────────┤
//!                                   ▼
//!                               committed
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pluribus_cfg::device::{DeviceConfig, SshSession};
//! use pluribus_cfg::lifecycle::{CandidateSource, ConfigManager};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = SshSession::new(DeviceConfig::new("switch01.lab", "admin"))?;
//!     let mut config = ConfigManager::new(session).await?;
//!
//!     config
//!         .load_candidate(CandidateSource::file("uplinks.cfg"))
//!         .await?;
//!     print!("{}", config.compare().await?);
//!
//!     if config.changed().await? {
//!         config.commit().await?;
//!     }
//!
//!     // Changed our mind
//!     config.rollback(1).await?;
//!     Ok(())
//! }
//! ```

use crate::device::SessionError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod diff;
pub mod history;
pub mod manager;
pub mod state;


pub use diff::unified_diff;
pub use history::{ConfigHistory, ConfigSnapshot, HistoryError};
pub use manager::ConfigManager;
pub use state::LifecycleState;

/// Where candidate configuration comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSource {
    /// Configuration text given directly
    Content(String),
    /// Path of a file holding the configuration text
    File(PathBuf),
}

impl CandidateSource {
    pub fn content(content: impl Into<String>) -> Self {
        Self::Content(content.into())
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }
}

impl From<&str> for CandidateSource {
    fn from(content: &str) -> Self {
        Self::Content(content.to_string())
    }
}

impl From<String> for CandidateSource {
    fn from(content: String) -> Self {
        Self::Content(content)
    }
}

impl From<PathBuf> for CandidateSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

/// Why configuration lines are being pushed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayMode {
    /// Operator candidate; a failure triggers an automatic discard
    Candidate,
    /// Snapshot replay on behalf of a rollback; failures are surfaced as-is
    Rollback,
}

/// Summary of the lifecycle bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleStatus {
    pub changed: bool,
    pub committed: bool,
    pub history_len: usize,
    pub available_rollbacks: usize,
}

/// Rollback failures
#[derive(Debug, thiserror::Error)]
pub enum RollbackError {
    #[error("cannot rollback to a negative offset ({0})")]
    NegativeOffset(i64),

    #[error("cannot rollback {requested} steps: only {available} available in history")]
    OutOfRange { requested: i64, available: usize },

    #[error("configuration history is corrupted: {len} entries")]
    HistoryCorrupted { len: usize },

    #[error("replaying configuration failed: {0}")]
    Replay(#[source] SessionError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Errors surfaced by [`ConfigManager`]
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// Candidate push failed; the automatic discard succeeded
    #[error("unable to load configuration on the device: {source}")]
    ConfigLoad {
        #[source]
        source: SessionError,
    },

    /// Candidate push failed and the automatic discard failed as well
    #[error("unable to load configuration on the device ({source}); discarding it failed too: {discard}")]
    ConfigLoadUnrecovered {
        #[source]
        source: SessionError,
        discard: Box<LifecycleError>,
    },

    #[error("rollback failed: {0}")]
    Rollback(#[source] RollbackError),

    #[error("unable to discard the candidate configuration: {0}")]
    Discard(#[source] RollbackError),

    #[error("unable to record the running configuration: {0}")]
    Commit(#[source] SessionError),

    #[error("unable to retrieve the running configuration for comparison: {0}")]
    Compare(#[source] SessionError),

    #[error("unable to capture the initial configuration: {0}")]
    Init(#[source] SessionError),

    /// Candidate file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RollbackError> for LifecycleError {
    fn from(error: RollbackError) -> Self {
        Self::Rollback(error)
    }
}

pub type Result<T> = std::result::Result<T, LifecycleError>;
