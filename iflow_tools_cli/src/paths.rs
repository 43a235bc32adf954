//! Well-known locations of configuration files
//!
//! The tools look for their configuration next to the repository first and
//! fall back to a per-user file.

use std::path::{Path, PathBuf};

/// The name of the application configuration directory
const APP_CONFIG_DIR: &str = "iflow-tools";

/// The name of the per-user configuration file
const USER_CONFIG_FILE: &str = "config.yaml";

/// Config file names looked up in the current directory, in order
pub const LOCAL_CONFIG_FILES: [&str; 2] = ["iflow-tools.yaml", "iflow-tools.yml"];

/// Returns the per-user configuration directory
///
/// - Linux: `~/.config/iflow-tools`
/// - macOS: `~/Library/Application Support/iflow-tools`
/// - Windows: `%APPDATA%/iflow-tools`
///
/// `None` when the platform has no notion of a config directory.
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_CONFIG_DIR))
}

/// Returns the per-user configuration file
pub fn get_user_config_path() -> Option<PathBuf> {
    get_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// Candidate config files inside `dir`, in lookup order
pub fn local_config_candidates(dir: &Path) -> Vec<PathBuf> {
    LOCAL_CONFIG_FILES.iter().map(|name| dir.join(name)).collect()
}
