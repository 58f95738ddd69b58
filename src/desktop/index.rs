//! Installed-application index
//!
//! Provides a trait so the dock can run against the real descriptor
//! directories or a test fixture.

use crate::desktop::descriptor::Descriptor;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Lookup interface over installed application descriptors
#[async_trait]
pub trait AppIndex: Send + Sync {
    /// Find an installed descriptor by id (file name without `.desktop`)
    async fn lookup_by_desktop_id(&self, id: &str) -> Option<Descriptor>;

    /// Load the descriptor stored at `path`
    async fn lookup_by_file(&self, path: &Path) -> Option<Descriptor>;
}

/// Index over a list of application directories, first match wins
#[derive(Debug, Clone)]
pub struct DirAppIndex {
    dirs: Vec<PathBuf>,
}

impl DirAppIndex {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }
}

#[async_trait]
impl AppIndex for DirAppIndex {
    async fn lookup_by_desktop_id(&self, id: &str) -> Option<Descriptor> {
        if id.is_empty() || id.contains('/') {
            return None;
        }

        for dir in &self.dirs {
            let path = dir.join(format!("{}.desktop", id));
            if !path.is_file() {
                continue;
            }
            match Descriptor::load(&path).await {
                Ok(desc) => {
                    debug!("desktop id {} -> {}", id, path.display());
                    return Some(desc);
                }
                Err(e) => warn!("Skipping descriptor {}: {}", path.display(), e),
            }
        }
        None
    }

    async fn lookup_by_file(&self, path: &Path) -> Option<Descriptor> {
        match Descriptor::load(path).await {
            Ok(desc) => Some(desc),
            Err(e) => {
                debug!("lookup_by_file {}: {}", path.display(), e);
                None
            }
        }
    }
}
