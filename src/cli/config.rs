//! Settings discovery and loading
//!
//! This module handles the settings discovery hierarchy:
//! 1. Current directory: ./pluribus-cfg.toml or ./.pluribus-cfg/config.toml
//! 2. User config: ~/.pluribus-cfg/config.toml
//! 3. System config: /etc/pluribus-cfg/config.toml
//! 4. Built-in defaults

use crate::device::DeviceConfig;
use crate::env;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env as std_env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Behaviour of the `apply` subcommand
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplySettings {
    /// Print the diff before committing
    #[serde(default = "default_true")]
    pub show_diff: bool,
    /// Ask for confirmation before committing
    #[serde(default = "default_true")]
    pub confirm: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ApplySettings {
    fn default() -> Self {
        Self {
            show_diff: true,
            confirm: true,
        }
    }
}

/// Everything read from a settings file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub apply: ApplySettings,
}

impl Settings {
    /// Load from TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid settings file: {}", path.display()))
    }

    /// Parse from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save to TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_toml_string()?)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;
        Ok(())
    }

    /// Apply command-line overrides on top of the loaded settings
    pub fn with_overrides(mut self, overrides: &DeviceOverrides) -> Self {
        if let Some(ref host) = overrides.host {
            self.device.host = host.clone();
        }
        if let Some(ref user) = overrides.user {
            self.device.username = user.clone();
        }
        if let Some(port) = overrides.port {
            self.device.port = port;
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.device.timeout_secs = timeout.max(1);
        }
        if let Some(ref identity) = overrides.identity_file {
            self.device.identity_file = Some(identity.clone());
        }
        self
    }
}

/// Device settings given on the command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceOverrides {
    pub host: Option<String>,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub timeout_secs: Option<u64>,
    pub identity_file: Option<PathBuf>,
}

/// Settings discovery system
pub struct ConfigDiscovery;

impl ConfigDiscovery {
    /// Load the explicit file if given, otherwise discover one
    pub fn load(explicit: Option<&Path>) -> Result<Settings> {
        match explicit {
            Some(path) => {
                info!("Loading settings from: {:?}", path);
                Settings::from_toml_file(path)
            }
            None => Self::discover_config(),
        }
    }

    /// Discover and load settings using the hierarchy
    pub fn discover_config() -> Result<Settings> {
        if let Some(config_path) = Self::find_config_file() {
            info!("Loading settings from: {:?}", config_path);
            return Settings::from_toml_file(config_path);
        }

        info!("No settings file found, using defaults");
        Ok(Settings::default())
    }

    /// Find settings file using discovery hierarchy
    pub fn find_config_file() -> Option<PathBuf> {
        Self::first_existing(Self::get_config_candidates())
    }

    fn first_existing(candidates: Vec<PathBuf>) -> Option<PathBuf> {
        for candidate in candidates {
            debug!("Checking for settings file: {:?}", candidate);
            if candidate.is_file() {
                debug!("Found settings file: {:?}", candidate);
                return Some(candidate);
            }
        }

        debug!("No settings file found in discovery hierarchy");
        None
    }

    /// Get list of settings file candidates in priority order
    fn get_config_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Ok(current_dir) = std_env::current_dir() {
            candidates.push(current_dir.join(env::LOCAL_CONFIG_FILE_NAME));
            candidates.push(env::local_config_file_path(&current_dir));
        }

        if let Some(home_dir) = Self::get_home_dir() {
            candidates.push(env::user_config_file_path(&home_dir));
        }

        #[cfg(unix)]
        candidates.push(PathBuf::from(env::SYSTEM_CONFIG_FILE));

        candidates
    }

    /// Get home directory path
    fn get_home_dir() -> Option<PathBuf> {
        std_env::var("HOME")
            .ok()
            .or_else(|| std_env::var("USERPROFILE").ok())
            .map(PathBuf::from)
    }

    /// Show settings discovery information for debugging
    pub fn show_discovery_info() {
        println!("Settings Discovery Hierarchy:");
        println!();

        let candidates = Self::get_config_candidates();
        for (i, candidate) in candidates.iter().enumerate() {
            let status = if candidate.exists() {
                if candidate.is_file() {
                    "✓ EXISTS"
                } else {
                    "✗ NOT A FILE"
                }
            } else {
                "✗ NOT FOUND"
            };

            println!("  {}. {:?} - {}", i + 1, candidate, status);
        }

        println!();
        if let Some(found) = Self::find_config_file() {
            println!("Active settings: {:?}", found);
        } else {
            println!("Active settings: Built-in defaults");
        }
    }
}
