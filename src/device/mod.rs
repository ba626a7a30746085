//! # Device Session Layer
//!
//! Provides the command execution primitive the configuration lifecycle is
//! built on: run one CLI command on a Netvisor switch and capture its output,
//! or fetch the running configuration as text.
//!
//! ## Core Components
//!
//! - **[`DeviceSession`]**: async trait implemented by every session backend
//! - **[`SshSession`]**: non-interactive SSH execution, one process per command
//! - **[`SimulatedDevice`]**: in-memory switch with failure injection
//! - **[`DeviceConfig`]**: connection settings (host, credentials, timeouts)
//! - **[`SessionError`]**: transport and command failures
//!
//! ## Execution Flow
//!
//! ```text
//!   ConfigManager
//!        ↓
//!   DeviceSession::run()
//!        ↓
//!   ┌────┴─────┐
//!   │          │
//!  SSH     Simulated
//!   │          │
//!   ↓          ↓
//! switch   in-memory lines
//!   │          │
//!   └────┬─────┘
//!        ↓
//!  command output
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pluribus_cfg::device::{DeviceConfig, DeviceSession, SshSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DeviceConfig::new("switch01.lab", "admin");
//!     let session = SshSession::new(config)?;
//!
//!     let info = session.show("switch info", ";").await?;
//!     println!("{}", info);
//!
//!     let running = session.fetch_running_config().await?;
//!     println!("{} lines of configuration", running.lines().count());
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use std::time::Duration;

/// Connection settings for a Netvisor switch.
pub mod config;

/// SSH-backed session.
///
/// Implements [`SshSession`], spawning the system `ssh` client through
/// `tokio::process::Command` for every command.
pub mod ssh;

/// In-memory switch used by tests and dry runs.
pub mod simulated;

pub use config::DeviceConfig;
pub use simulated::SimulatedDevice;
pub use ssh::SshSession;

/// CLI command that prints the running configuration.
pub const RUNNING_CONFIG_COMMAND: &str = "running-config-show";

/// Command used to check that the switch answers.
pub const HEALTH_CHECK_COMMAND: &str = "switch-info-show";

/// Delimiter used for parsable show output when the caller gives none.
pub const DEFAULT_DELIMITER: &str = ";";

/// Errors raised while talking to the device
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Command did not complete in time
    #[error("Execution of command took too long: timeout after {0:?}")]
    Timeout(Duration),

    /// Command was rejected or its output could not be retrieved
    #[error("Unable to execute command: {0}")]
    CommandExecution(String),

    /// Device could not be reached
    #[error("Cannot connect to the device: {0}")]
    Connection(String),

    /// I/O error while driving the transport
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A channel to one switch able to execute CLI commands.
///
/// Each call to [`run`](DeviceSession::run) is an independent command
/// invocation; the device applies it immediately.
#[async_trait]
pub trait DeviceSession: Send + Sync {
    /// Execute a single command and return its raw output.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the command times out, is rejected,
    /// or the device cannot be reached.
    async fn run(&self, command: &str) -> Result<String, SessionError>;

    /// Download the current running configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the configuration cannot be retrieved.
    async fn fetch_running_config(&self) -> Result<String, SessionError> {
        self.run(RUNNING_CONFIG_COMMAND).await
    }

    /// Execute a `-show` command with parsable output.
    ///
    /// An empty delimiter falls back to [`DEFAULT_DELIMITER`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::CommandExecution`] if the command is not a
    /// show command, or any error from [`run`](DeviceSession::run).
    async fn execute_show(&self, show_command: &str, delim: &str) -> Result<String, SessionError> {
        if !show_command.ends_with("-show") {
            return Err(SessionError::CommandExecution(
                "All show commands must end with \"-show\"!".to_string(),
            ));
        }

        let delim = if delim.is_empty() {
            DEFAULT_DELIMITER
        } else {
            delim
        };

        self.run(&format!("{} parsable-delim {}", show_command, delim))
            .await
    }

    /// Execute a show command given in loose form (`"switch info"`).
    ///
    /// # Errors
    ///
    /// Same as [`execute_show`](DeviceSession::execute_show).
    async fn show(&self, command: &str, delim: &str) -> Result<String, SessionError> {
        let command = normalize_show_command(command);
        self.execute_show(&command, delim).await
    }

    /// Check if the device answers
    ///
    /// # Errors
    ///
    /// Returns an error if the device is unreachable.
    async fn health_check(&self) -> Result<(), SessionError> {
        Ok(())
    }

    /// Session backend name for logging
    fn session_type(&self) -> &'static str;

    /// Release transport resources
    ///
    /// # Errors
    ///
    /// Returns an error if cleanup fails.
    async fn close(&self) -> Result<(), SessionError> {
        Ok(())
    }
}

/// Whether `command` only reads state (`running-config-show`,
/// `l2-table-show parsable-delim ;`).
pub fn is_show_command(command: &str) -> bool {
    command
        .split_whitespace()
        .next()
        .is_some_and(|verb| verb.ends_with("-show"))
}

/// Turn `"l2 table"` into `"l2-table-show"`.
pub fn normalize_show_command(command: &str) -> String {
    let mut command = command.trim().to_string();
    if !command.ends_with("-show") {
        command.push_str("-show");
    }
    command.replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_show_command() {
        assert_eq!(normalize_show_command("l2 table"), "l2-table-show");
        assert_eq!(normalize_show_command("switch-info"), "switch-info-show");
        assert_eq!(normalize_show_command("bootenv-show"), "bootenv-show");
    }

    #[test]
    fn test_is_show_command() {
        assert!(is_show_command(RUNNING_CONFIG_COMMAND));
        assert!(is_show_command("l2-table-show parsable-delim ;"));
        assert!(!is_show_command("vlan-create id 10 description port-show"));
        assert!(!is_show_command(""));
    }

    #[tokio::test]
    async fn test_execute_show_formats_delimiter() {
        let device = SimulatedDevice::new("");

        device.execute_show("bootenv-show", "$$").await.unwrap();
        device.execute_show("node-show", "").await.unwrap();

        let commands = device.commands().await;
        assert_eq!(commands[0], "bootenv-show parsable-delim $$");
        assert_eq!(commands[1], "node-show parsable-delim ;");
    }

    #[tokio::test]
    async fn test_execute_show_rejects_non_show_command() {
        let device = SimulatedDevice::new("");

        let result = device.execute_show("switch-config-reset", ";").await;
        assert!(matches!(result, Err(SessionError::CommandExecution(_))));
        assert!(device.commands().await.is_empty());
    }

    #[tokio::test]
    async fn test_show_normalizes_command() {
        let device = SimulatedDevice::new("");

        device.show("l2 table", ";").await.unwrap();

        assert_eq!(device.commands().await, vec!["l2-table-show parsable-delim ;"]);
    }
}
