//! Environment constants and path utilities.
//!
//! This module centralizes the file and directory names used for settings
//! discovery, making them easier to maintain and modify.

use std::path::{Path, PathBuf};

/// Application directory name (hidden directory like .git, .vscode)
pub const APP_DIR_NAME: &str = ".pluribus-cfg";

/// Settings file name inside the application directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Settings file name looked up directly in the current directory
pub const LOCAL_CONFIG_FILE_NAME: &str = "pluribus-cfg.toml";

/// System-wide settings file
pub const SYSTEM_CONFIG_FILE: &str = "/etc/pluribus-cfg/config.toml";

/// Default tracing filter for the binary
pub const DEFAULT_LOG_FILTER: &str = "pluribus_cfg=info";

/// Tracing filter used with `--verbose`
pub const VERBOSE_LOG_FILTER: &str = "pluribus_cfg=debug";

/// Build the application directory path under `root`
pub fn app_dir_path(root: &Path) -> PathBuf {
    root.join(APP_DIR_NAME)
}

/// Build the settings file path in the user's home directory
pub fn user_config_file_path(home_dir: &Path) -> PathBuf {
    app_dir_path(home_dir).join(CONFIG_FILE_NAME)
}

/// Build the settings file path inside the application directory of the
/// current directory
pub fn local_config_file_path(current_dir: &Path) -> PathBuf {
    app_dir_path(current_dir).join(CONFIG_FILE_NAME)
}
