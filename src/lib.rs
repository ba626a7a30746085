//! # Pluribus Config
//!
//! Commit, rollback and diff for Pluribus Netvisor switches. Netvisor applies
//! every CLI command immediately and keeps no candidate configuration, so this
//! crate emulates one: it snapshots the running configuration at every commit
//! and replays snapshots line by line to move the switch back.
//!
//! ## Architecture Overview
//!
//! - **[`device`]**: the [`DeviceSession`] trait with SSH and simulated backends
//! - **[`lifecycle`]**: [`ConfigManager`], snapshot history and diffing
//! - **[`cli`]**: argument parsing, settings discovery and shell commands
//! - **[`env`]**: file names and path helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pluribus_cfg::{ConfigManager, DeviceConfig, SshSession};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let session = SshSession::new(DeviceConfig::new("switch01.lab", "admin"))?;
//!     let mut config = ConfigManager::new(session).await?;
//!
//!     config
//!         .load_candidate("vlan-create id 101 scope fabric description uplinks")
//!         .await?;
//!     println!("{}", config.compare().await?);
//!     config.commit().await?;
//!     Ok(())
//! }
//! ```

/// Device sessions.
///
/// Command execution against a switch, over SSH or against an in-memory
/// simulation.
pub mod device;

/// Configuration lifecycle emulation.
///
/// Snapshot history, candidate loading, commit, discard, rollback and diff.
pub mod lifecycle;

/// Environment constants and path utilities.
pub mod env;

/// Command-line interface.
///
/// Argument parsing, settings discovery and the interactive shell parser.
pub mod cli;

pub use device::{DeviceConfig, DeviceSession, SessionError, SimulatedDevice, SshSession};
pub use lifecycle::{
    CandidateSource, ConfigHistory, ConfigManager, ConfigSnapshot, LifecycleError,
    LifecycleStatus, RollbackError,
};
