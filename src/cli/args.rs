//! Command line argument parsing
//!
//! This module handles CLI argument parsing with subcommands:
//! - `apply`: Load a candidate file, show the diff, commit or discard it
//! - `shell`: Interactive configuration session on one switch
//! - `show-config`: Show settings discovery information

use super::config::DeviceOverrides;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug)]
pub enum ExecutionMode {
    Apply(ApplyConfig),
    Shell(ShellConfig),
    ShowConfig,
}

#[derive(Debug)]
pub struct ApplyConfig {
    pub candidate: PathBuf,
    pub config_override: Option<PathBuf>,
    pub device: DeviceOverrides,
    pub verbose: bool,
    pub dry_run: bool,
    pub assume_yes: bool,
}

#[derive(Debug)]
pub struct ShellConfig {
    pub config_override: Option<PathBuf>,
    pub device: DeviceOverrides,
    pub verbose: bool,
}

/// Connection flags shared by the device subcommands
#[derive(Debug, Clone, Default, clap::Args)]
pub struct DeviceArgs {
    /// Switch hostname or address
    #[arg(short = 'H', long = "host")]
    pub host: Option<String>,
    /// Login user
    #[arg(short = 'u', long = "user")]
    pub user: Option<String>,
    /// SSH port
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,
    /// Per-command timeout in seconds
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout: Option<u64>,
    /// SSH private key
    #[arg(short = 'i', long = "identity", value_name = "FILE")]
    pub identity: Option<PathBuf>,
}

impl From<&DeviceArgs> for DeviceOverrides {
    fn from(args: &DeviceArgs) -> Self {
        Self {
            host: args.host.clone(),
            user: args.user.clone(),
            port: args.port,
            timeout_secs: args.timeout,
            identity_file: args.identity.clone(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "pluribus-cfg")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Commit, rollback and diff configuration on Pluribus Netvisor switches")]
#[command(long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load a candidate configuration file, show the diff and commit it
    Apply {
        /// Candidate configuration file, one CLI command per line
        file: PathBuf,
        #[command(flatten)]
        device: DeviceArgs,
        /// Settings file path
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
        /// Enable verbose output
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
        /// Show the diff, then discard instead of committing
        #[arg(short = 'n', long = "dry-run")]
        dry_run: bool,
        /// Commit without asking for confirmation
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },
    /// Run an interactive configuration session
    Shell {
        #[command(flatten)]
        device: DeviceArgs,
        /// Settings file path
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
        /// Enable verbose output
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },
    /// Show settings discovery information
    ShowConfig,
}

impl Args {
    pub fn parse() -> Self {
        Parser::parse()
    }

    pub fn mode(&self) -> Result<ExecutionMode, String> {
        match &self.command {
            Some(Commands::Apply {
                file,
                device,
                config,
                verbose,
                dry_run,
                yes,
            }) => Ok(ExecutionMode::Apply(ApplyConfig {
                candidate: file.clone(),
                config_override: config.clone(),
                device: device.into(),
                verbose: *verbose,
                dry_run: *dry_run,
                assume_yes: *yes,
            })),
            Some(Commands::Shell {
                device,
                config,
                verbose,
            }) => Ok(ExecutionMode::Shell(ShellConfig {
                config_override: config.clone(),
                device: device.into(),
                verbose: *verbose,
            })),
            Some(Commands::ShowConfig) => Ok(ExecutionMode::ShowConfig),
            None => Err(
                "No command specified. Use 'pluribus-cfg --help' to see available commands."
                    .to_string(),
            ),
        }
    }

    /// Whether the selected subcommand asked for verbose output
    pub fn verbose(&self) -> bool {
        matches!(
            self.command,
            Some(Commands::Apply { verbose: true, .. }) | Some(Commands::Shell { verbose: true, .. })
        )
    }
}
