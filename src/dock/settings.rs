//! Pinned-list storage

use crate::error::{DockError, DockResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

/// Settings backend holding the ordered list of docked descriptor ids
#[async_trait]
pub trait DockSettings: Send + Sync {
    async fn docked_apps(&self) -> DockResult<Vec<String>>;

    async fn set_docked_apps(&self, apps: &[String]) -> DockResult<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    docked_apps: Vec<String>,
}

/// TOML file settings backend
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
}

impl FileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DockSettings for FileSettings {
    async fn docked_apps(&self) -> DockResult<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            DockError::io(format!("reading settings {}", self.path.display()), e)
        })?;
        let file: SettingsFile = toml::from_str(&content).map_err(|e| DockError::ConfigInvalid {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        Ok(file.docked_apps)
    }

    async fn set_docked_apps(&self, apps: &[String]) -> DockResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DockError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let content = toml::to_string_pretty(&SettingsFile {
            docked_apps: apps.to_vec(),
        })?;
        fs::write(&self.path, content).await.map_err(|e| {
            DockError::io(format!("writing settings {}", self.path.display()), e)
        })?;

        debug!("docked apps: {:?}", apps);
        Ok(())
    }
}
