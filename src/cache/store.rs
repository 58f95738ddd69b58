//! File-backed string key/value store
//!
//! The backing file is read lazily on first access; a missing file is an
//! empty map. With auto-save enabled every mutation is flushed before the
//! call returns. Flush failures are logged, the in-memory map stays valid.

use crate::error::{DockError, DockResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

type Map = BTreeMap<String, String>;

/// Durable string-to-string cache
#[derive(Debug)]
pub struct KvCache {
    path: PathBuf,
    auto_save: bool,
    // `None` until the backing file has been read
    map: Mutex<Option<Map>>,
}

impl KvCache {
    /// Create a cache backed by `path`. Nothing is read until first access.
    pub fn new(path: impl Into<PathBuf>, auto_save: bool) -> Self {
        Self {
            path: path.into(),
            auto_save,
            map: Mutex::new(None),
        }
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a key
    pub async fn get(&self, key: &str) -> Option<String> {
        let mut guard = self.map.lock().await;
        Self::loaded(&self.path, &mut guard).await.get(key).cloned()
    }

    /// Insert or replace a key
    pub async fn set(&self, key: &str, value: &str) {
        let mut guard = self.map.lock().await;
        let map = Self::loaded(&self.path, &mut guard).await;
        if map.get(key).map(String::as_str) == Some(value) {
            return;
        }
        map.insert(key.to_string(), value.to_string());
        debug!("cache {}: {} -> {}", self.path.display(), key, value);
        if self.auto_save {
            self.save_logged(map).await;
        }
    }

    /// Remove a key, if present
    pub async fn remove(&self, key: &str) {
        let mut guard = self.map.lock().await;
        let map = Self::loaded(&self.path, &mut guard).await;
        if map.remove(key).is_some() && self.auto_save {
            self.save_logged(map).await;
        }
    }

    /// Snapshot of every entry, sorted by key
    pub async fn entries(&self) -> Vec<(String, String)> {
        let mut guard = self.map.lock().await;
        Self::loaded(&self.path, &mut guard)
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Drop every entry and delete the backing file
    pub async fn clear(&self) -> DockResult<()> {
        let mut guard = self.map.lock().await;
        *guard = Some(Map::new());
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DockError::io(
                format!("removing cache file {}", self.path.display()),
                e,
            )),
        }
    }

    /// Write the full map to the backing file
    pub async fn flush(&self) -> DockResult<()> {
        let guard = self.map.lock().await;
        match guard.as_ref() {
            Some(map) => write_map(&self.path, map).await,
            // Never loaded, nothing could have changed
            None => Ok(()),
        }
    }

    async fn save_logged(&self, map: &Map) {
        if let Err(e) = write_map(&self.path, map).await {
            warn!("Failed to save cache {}: {}", self.path.display(), e);
        }
    }

    async fn loaded<'a>(path: &Path, slot: &'a mut Option<Map>) -> &'a mut Map {
        if slot.is_none() {
            *slot = Some(read_map(path).await);
        }
        slot.get_or_insert_with(Map::new)
    }
}

async fn read_map(path: &Path) -> Map {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("cache file {} missing, starting empty", path.display());
            return Map::new();
        }
        Err(e) => {
            warn!("Failed to read cache {}: {}", path.display(), e);
            return Map::new();
        }
    };

    serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!("Discarding corrupt cache {}: {}", path.display(), e);
        Map::new()
    })
}

async fn write_map(path: &Path, map: &Map) -> DockResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| DockError::io(format!("creating cache dir {}", parent.display()), e))?;
    }

    let content = serde_json::to_string_pretty(map)?;
    fs::write(path, content)
        .await
        .map_err(|e| DockError::io(format!("writing cache file {}", path.display()), e))
}
