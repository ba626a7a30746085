//! CLI-specific functionality
//!
//! This module contains all CLI-related code including argument parsing,
//! settings discovery and the interactive shell commands.

pub mod args;
pub mod config;
pub mod shell;

pub use args::{ApplyConfig, Args, ExecutionMode, ShellConfig};
pub use config::{ApplySettings, ConfigDiscovery, DeviceOverrides, Settings};
pub use shell::{ShellCommand, show_shell_help};
