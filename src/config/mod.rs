//! Configuration management for dockd

pub mod schema;

pub use schema::Config;

use crate::error::{DockError, DockResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// File name of the window-identity to descriptor-identity cache
const WINDOW_CACHE_FILE: &str = "window_identity.json";

/// File name of the identity to descriptor-path cache
const PATH_CACHE_FILE: &str = "identity_path.json";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dockd")
            .join("config.toml")
    }

    /// Path of the window-identity cache for a given config
    pub fn window_cache_path(config: &Config) -> PathBuf {
        config.paths.cache_dir.join(WINDOW_CACHE_FILE)
    }

    /// Path of the identity-to-descriptor-path cache for a given config
    pub fn path_cache_path(config: &Config) -> PathBuf {
        config.paths.cache_dir.join(PATH_CACHE_FILE)
    }

    /// Load configuration, falling back to defaults if not exists
    pub async fn load(&self) -> DockResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> DockResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| DockError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| DockError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> DockResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            DockError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> DockResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DockError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
