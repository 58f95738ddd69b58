//! Window identification
//!
//! A window is matched to a descriptor by trying each [`Strategy`] in order;
//! the first hit wins. When nothing matches the window's own derived key is
//! its identity and the entry stays unidentified.
//!
//! The caches only speed things up. A descriptor synthesized for the window
//! is still found in the scratch directory after they are wiped, and the
//! lookup writes both mappings back.

use crate::cache::KvCache;
use crate::desktop::{AppIndex, Descriptor};
use crate::identity::IdentityKey;
use crate::scratch::ScratchDir;
use crate::window::WindowInfo;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolution steps, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    /// The window names an installed descriptor
    Installed,
    /// A previous dock recorded which descriptor backs this window
    Cached,
    /// A descriptor synthesized for this window is still on disk
    Scratch,
}

const STRATEGIES: [Strategy; 3] = [Strategy::Installed, Strategy::Cached, Strategy::Scratch];

/// Outcome of identifying a window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub identity: IdentityKey,
    pub descriptor: Option<Descriptor>,
}

/// Maps live windows to identities, backed by the two identity caches
pub struct IdentityResolver {
    index: Arc<dyn AppIndex>,
    scratch: ScratchDir,
    window_cache: Arc<KvCache>,
    path_cache: Arc<KvCache>,
}

impl IdentityResolver {
    pub fn new(
        index: Arc<dyn AppIndex>,
        scratch: ScratchDir,
        window_cache: Arc<KvCache>,
        path_cache: Arc<KvCache>,
    ) -> Self {
        Self {
            index,
            scratch,
            window_cache,
            path_cache,
        }
    }

    /// Identify a window
    pub async fn identify(&self, window: &WindowInfo) -> Resolution {
        let window_key = window.identity();

        for strategy in STRATEGIES {
            if let Some(descriptor) = self.attempt(strategy, window, &window_key).await {
                debug!(
                    "window {} identified by {:?} as {}",
                    window.id, strategy, descriptor.identity
                );
                return Resolution {
                    identity: descriptor.identity.clone(),
                    descriptor: Some(descriptor),
                };
            }
        }

        debug!("window {} unidentified, using {}", window.id, window_key);
        Resolution {
            identity: window_key,
            descriptor: None,
        }
    }

    /// Record that `previous` was docked as `descriptor`
    ///
    /// The window mapping is only kept for window-derived keys, the path
    /// mapping always.
    pub async fn remember(&self, previous: &IdentityKey, descriptor: &Descriptor) {
        if previous.is_window_derived() {
            self.window_cache
                .set(previous.as_str(), descriptor.identity.as_str())
                .await;
        }
        self.remember_path(descriptor).await;
    }

    /// Record where the descriptor backing an identity lives
    pub async fn remember_path(&self, descriptor: &Descriptor) {
        self.path_cache
            .set(descriptor.identity.as_str(), &descriptor.path.to_string_lossy())
            .await;
    }

    /// Drop the path mapping of an identity whose descriptor was removed
    pub async fn forget_path(&self, identity: &IdentityKey) {
        self.path_cache.remove(identity.as_str()).await;
    }

    /// Flush both caches
    pub async fn flush(&self) {
        for cache in [&self.window_cache, &self.path_cache] {
            if let Err(e) = cache.flush().await {
                warn!("Failed to flush cache {}: {}", cache.path().display(), e);
            }
        }
    }

    async fn attempt(
        &self,
        strategy: Strategy,
        window: &WindowInfo,
        window_key: &IdentityKey,
    ) -> Option<Descriptor> {
        match strategy {
            Strategy::Installed => self.installed(window).await,
            Strategy::Cached => self.cached(window_key).await,
            Strategy::Scratch => self.synthesized(window_key).await,
        }
    }

    async fn installed(&self, window: &WindowInfo) -> Option<Descriptor> {
        let class_id = window.class.to_lowercase();
        let candidates = [window.app_id.as_deref(), Some(class_id.as_str())];

        for id in candidates.into_iter().flatten() {
            if let Some(descriptor) = self.index.lookup_by_desktop_id(id).await {
                return Some(descriptor);
            }
        }
        None
    }

    async fn cached(&self, window_key: &IdentityKey) -> Option<Descriptor> {
        let key = self
            .window_cache
            .get(window_key.as_str())
            .await
            .unwrap_or_else(|| window_key.to_string());

        let path = self.path_cache.get(&key).await?;
        let path = Path::new(&path);
        if !path.is_file() {
            debug!("cached descriptor {} for {} is gone", path.display(), key);
            return None;
        }

        match Descriptor::load(path).await {
            Ok(descriptor) => Some(descriptor),
            Err(e) => {
                warn!("Cached descriptor {} unusable: {}", path.display(), e);
                None
            }
        }
    }

    async fn synthesized(&self, window_key: &IdentityKey) -> Option<Descriptor> {
        let path = self.scratch.descriptor_path(&window_key.scratch_id());
        if !path.is_file() {
            return None;
        }

        match Descriptor::load(&path).await {
            Ok(descriptor) => {
                debug!("rebuilding cache entries for {}", window_key);
                self.remember(window_key, &descriptor).await;
                Some(descriptor)
            }
            Err(e) => {
                warn!("Scratch descriptor {} unusable: {}", path.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::DirAppIndex;
    use crate::scratch::SynthesisRequest;
    use tempfile::TempDir;

    struct Fixture {
        temp: TempDir,
        resolver: IdentityResolver,
        scratch: ScratchDir,
        window_cache: Arc<KvCache>,
        path_cache: Arc<KvCache>,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let apps = temp.path().join("applications");
        std::fs::create_dir_all(&apps).unwrap();

        let index = Arc::new(DirAppIndex::new(vec![apps]));
        let scratch = ScratchDir::new(temp.path().join("scratch"), "icon");
        let window_cache = Arc::new(KvCache::new(temp.path().join("w.json"), true));
        let path_cache = Arc::new(KvCache::new(temp.path().join("p.json"), true));
        let resolver = IdentityResolver::new(
            index,
            scratch.clone(),
            Arc::clone(&window_cache),
            Arc::clone(&path_cache),
        );

        Fixture {
            temp,
            resolver,
            scratch,
            window_cache,
            path_cache,
        }
    }

    fn window(app_id: Option<&str>) -> WindowInfo {
        WindowInfo {
            id: 1,
            title: "Notes".to_string(),
            icon: String::new(),
            command: Some("/usr/bin/notes".to_string()),
            executable: "/usr/bin/notes".to_string(),
            class: "NotesWindow".to_string(),
            app_id: app_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn installed_descriptor_wins() {
        let f = fixture();
        let path = f.temp.path().join("applications/notes.desktop");
        std::fs::write(&path, "[Desktop Entry]\nName=Notes\nExec=notes\n").unwrap();

        let res = f.resolver.identify(&window(Some("notes"))).await;
        assert_eq!(res.descriptor.as_ref().unwrap().path, path);
        assert!(!res.identity.is_window_derived());
    }

    #[tokio::test]
    async fn class_name_is_a_fallback_desktop_id() {
        let f = fixture();
        std::fs::write(
            f.temp.path().join("applications/noteswindow.desktop"),
            "[Desktop Entry]\nName=Notes\n",
        )
        .unwrap();

        let res = f.resolver.identify(&window(None)).await;
        assert!(res.descriptor.is_some());
    }

    #[tokio::test]
    async fn unknown_window_uses_window_key() {
        let f = fixture();
        let w = window(Some("missing"));
        let res = f.resolver.identify(&w).await;
        assert_eq!(res.identity, w.identity());
        assert!(res.descriptor.is_none());
    }

    #[tokio::test]
    async fn remembered_docking_is_found_again() {
        let f = fixture();
        let w = window(None);
        let path = f.temp.path().join("docked.desktop");
        std::fs::write(&path, "[Desktop Entry]\nName=Notes\nExec=/s/x.sh %U\n").unwrap();
        let desc = Descriptor::load(&path).await.unwrap();

        f.resolver.remember(&w.identity(), &desc).await;
        assert_eq!(
            f.window_cache.get(w.identity().as_str()).await.as_deref(),
            Some(desc.identity.as_str())
        );

        let res = f.resolver.identify(&w).await;
        assert_eq!(res.identity, desc.identity);

        // descriptor removed: back to the window key, mapping kept
        std::fs::remove_file(&path).unwrap();
        let res = f.resolver.identify(&w).await;
        assert_eq!(res.identity, w.identity());
        assert!(f.window_cache.get(w.identity().as_str()).await.is_some());
    }

    #[tokio::test]
    async fn descriptor_keys_skip_window_mapping() {
        let f = fixture();
        let path = f.temp.path().join("a.desktop");
        std::fs::write(&path, "[Desktop Entry]\nName=A\n").unwrap();
        let desc = Descriptor::load(&path).await.unwrap();

        f.resolver.remember(&desc.identity, &desc).await;
        assert!(f.window_cache.entries().await.is_empty());
    }

    #[tokio::test]
    async fn scratch_descriptor_survives_cache_loss() {
        let f = fixture();
        let w = window(None);
        let window_key = w.identity();
        let desc = f
            .scratch
            .synthesize(SynthesisRequest {
                id: &window_key.scratch_id(),
                title: "Notes",
                icon: "",
                command: Some("/usr/bin/notes"),
                installed: None,
            })
            .await
            .unwrap();
        assert!(f.window_cache.entries().await.is_empty());

        let res = f.resolver.identify(&w).await;
        assert_eq!(res.identity, desc.identity);
        assert_eq!(res.descriptor.unwrap().path, desc.path);

        // both mappings written back
        assert_eq!(
            f.window_cache.get(window_key.as_str()).await.as_deref(),
            Some(desc.identity.as_str())
        );
        assert_eq!(
            f.path_cache.get(desc.identity.as_str()).await,
            Some(desc.path.to_string_lossy().into_owned())
        );

        f.scratch.discard(&window_key.scratch_id()).await;
        assert_eq!(f.resolver.identify(&w).await.identity, window_key);
    }
}
