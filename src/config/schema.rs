//! Configuration schema for dockd
//!
//! Configuration is stored at `~/.config/dockd/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Filesystem locations
    pub paths: PathsConfig,

    /// Docking behaviour
    pub dock: DockConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Append dock/undock events to the journal file
    pub journal: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            journal: true,
        }
    }
}

/// Filesystem locations used by the dock service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Private directory holding synthesized descriptors
    pub scratch_dir: PathBuf,

    /// Directory holding the two identity cache files
    pub cache_dir: PathBuf,

    /// File persisting the pinned list
    pub settings_file: PathBuf,

    /// Dock journal (JSON lines)
    pub journal_file: PathBuf,

    /// Directories searched for installed descriptors, in priority order
    pub application_dirs: Vec<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dockd");
        let state_dir = dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dockd");
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dockd");

        let mut application_dirs = Vec::new();
        if let Some(data) = dirs::data_dir() {
            application_dirs.push(data.join("applications"));
        }
        application_dirs.push(PathBuf::from("/usr/local/share/applications"));
        application_dirs.push(PathBuf::from("/usr/share/applications"));

        Self {
            scratch_dir: config_dir.join("scratch"),
            cache_dir,
            settings_file: config_dir.join("docked.toml"),
            journal_file: state_dir.join("journal.log"),
            application_dirs,
        }
    }
}

/// Docking behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DockConfig {
    /// Icon name used when a window icon cannot be materialized
    pub default_icon: String,

    /// Flush identity caches after every mutation
    pub auto_save_caches: bool,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            default_icon: "application-default-icon".to_string(),
            auto_save_caches: true,
        }
    }
}
