//! Device connection settings.
//!
//! Defines [`DeviceConfig`], the serde-backed description of how to reach a
//! switch and how to recognize a rejected command in its output.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Connection settings for one switch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceConfig {
    /// Hostname or address of the switch
    #[serde(default)]
    pub host: String,

    /// Login user
    #[serde(default = "default_username")]
    pub username: String,

    /// SSH port (default: 22)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-command timeout in seconds (default: 60)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Private key passed to ssh with `-i` (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_file: Option<PathBuf>,

    /// SSH client binary (default: "ssh")
    #[serde(default = "default_ssh_program")]
    pub ssh_program: String,

    /// Output substrings that mark a command as rejected by the CLI
    #[serde(default = "default_error_markers")]
    pub error_markers: Vec<String>,
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_port() -> u16 {
    22
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_ssh_program() -> String {
    "ssh".to_string()
}

fn default_error_markers() -> Vec<String> {
    vec![
        "ERROR".to_string(),
        "Unrecognized command".to_string(),
        "Invalid".to_string(),
    ]
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            username: default_username(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            identity_file: None,
            ssh_program: default_ssh_program(),
            error_markers: default_error_markers(),
        }
    }
}

impl DeviceConfig {
    /// Create a config for the given host and user with default settings
    pub fn new(host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            ..Default::default()
        }
    }

    /// Set the SSH port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the per-command timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Set the private key file
    pub fn with_identity_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.identity_file = Some(path.into());
        self
    }

    /// Per-command timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Prompt printed by the Netvisor CLI for this login
    pub fn cli_banner(&self) -> String {
        format!("CLI ({}@{}) > ", self.username, self.host)
    }

    /// Find the first error marker contained in `output`
    pub fn rejection_marker<'a>(&'a self, output: &str) -> Option<&'a str> {
        self.error_markers
            .iter()
            .find(|marker| !marker.is_empty() && output.contains(marker.as_str()))
            .map(String::as_str)
    }
}
