//! Dock manager
//!
//! Owns the entry collection, routes window events to entries, runs
//! dock/undock transitions and persists the pinned list after each one.
//!
//! Lock order is collection, then entry. Nothing takes the collection lock
//! while holding an entry lock.

use crate::cache::KvCache;
use crate::config::{Config, ConfigManager};
use crate::desktop::{AppIndex, Descriptor, DirAppIndex};
use crate::dock::entry::{DockContext, DockEntry, EntryId, EntryState, EntryView, UndockOutcome};
use crate::dock::resolver::IdentityResolver;
use crate::dock::settings::{DockSettings, FileSettings};
use crate::error::{DockError, DockResult};
use crate::identity::SCRATCH_PREFIX;
use crate::journal::{DockJournal, JournalEvent};
use crate::scratch::ScratchDir;
use crate::window::{WindowEvent, WindowId, WindowInfo};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{debug, info, warn};

/// Dock service state shared by every event source
pub struct DockManager {
    ctx: DockContext,
    settings: Arc<dyn DockSettings>,
    journal: DockJournal,
    entries: RwLock<Vec<Arc<DockEntry>>>,
    // Last persisted pinned list; the lock also serializes saves
    pinned: Mutex<Vec<String>>,
}

impl DockManager {
    pub fn new(ctx: DockContext, settings: Arc<dyn DockSettings>, journal: DockJournal) -> Self {
        Self {
            ctx,
            settings,
            journal,
            entries: RwLock::new(Vec::new()),
            pinned: Mutex::new(Vec::new()),
        }
    }

    /// Build a manager from configuration and restore the pinned entries
    pub async fn from_config(config: &Config) -> DockResult<Self> {
        let index: Arc<dyn AppIndex> =
            Arc::new(DirAppIndex::new(config.paths.application_dirs.clone()));
        let auto_save = config.dock.auto_save_caches;
        let window_cache = ConfigManager::window_cache_path(config);
        let window_cache = Arc::new(KvCache::new(window_cache, auto_save));
        let path_cache = Arc::new(KvCache::new(ConfigManager::path_cache_path(config), auto_save));

        let scratch = ScratchDir::new(&config.paths.scratch_dir, &config.dock.default_icon);
        let resolver = IdentityResolver::new(
            Arc::clone(&index),
            scratch.clone(),
            window_cache,
            path_cache,
        );
        let settings = Arc::new(FileSettings::new(&config.paths.settings_file));

        let manager = Self::new(
            DockContext::new(index, scratch, resolver),
            settings,
            DockJournal::new(config),
        );
        manager.restore().await?;
        Ok(manager)
    }

    /// Recreate windowless docked entries for the persisted pinned list
    pub async fn restore(&self) -> DockResult<usize> {
        let stored = self.settings.docked_apps().await?;
        let mut pinned = self.pinned.lock().await;
        let mut entries = self.entries.write().await;
        let mut restored = Vec::new();

        for id in stored {
            if restored.contains(&id) {
                continue;
            }
            let Some(descriptor) = self.descriptor_for_id(&id).await else {
                warn!("Skipping docked app {}: descriptor not found", id);
                continue;
            };

            let mut duplicate = false;
            for entry in entries.iter() {
                if entry.lock().await.identity == descriptor.identity {
                    duplicate = true;
                    break;
                }
            }
            if duplicate {
                continue;
            }

            self.ctx.resolver.remember_path(&descriptor).await;
            let mut state = EntryState::new(descriptor.identity.clone(), Some(descriptor), None);
            state.docked = true;
            state.refresh();
            entries.push(DockEntry::new(state));
            restored.push(id);
        }

        info!("Restored {} docked entries", restored.len());
        let count = restored.len();
        *pinned = restored;
        Ok(count)
    }

    async fn descriptor_for_id(&self, id: &str) -> Option<Descriptor> {
        if id.starts_with(SCRATCH_PREFIX) {
            let path = self.ctx.scratch.descriptor_path(id);
            return Descriptor::load(&path).await.ok();
        }
        self.ctx.index.lookup_by_desktop_id(id).await
    }

    /// Consume window events until every sender is dropped
    pub async fn run(&self, mut events: mpsc::Receiver<WindowEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        debug!("window event stream closed");
        self.shutdown().await;
    }

    pub async fn handle_event(&self, event: WindowEvent) {
        match event {
            WindowEvent::Opened { window } => self.window_opened(window).await,
            WindowEvent::Closed { id } => self.window_closed(id).await,
        }
    }

    async fn window_opened(&self, window: WindowInfo) {
        let resolution = self.ctx.resolver.identify(&window).await;
        let window_key = window.identity();
        let mut entries = self.entries.write().await;

        for entry in entries.iter() {
            let mut state = entry.lock().await;
            let same_app = state.identity == resolution.identity
                || state.holds_window(window.id)
                || state.windows.iter().any(|w| w.identity() == window_key);
            if same_app {
                debug!("window {} joins entry {}", window.id, state.identity);
                state.attach_window(window);
                return;
            }
        }

        debug!("window {} creates entry {}", window.id, resolution.identity);
        let state = EntryState::new(resolution.identity, resolution.descriptor, Some(window));
        entries.push(DockEntry::new(state));
    }

    async fn window_closed(&self, id: WindowId) {
        let mut entries = self.entries.write().await;

        let mut garbage = None;
        for (pos, entry) in entries.iter().enumerate() {
            let mut state = entry.lock().await;
            if state.detach_window(id) {
                if state.is_garbage() {
                    garbage = Some(pos);
                }
                break;
            }
        }

        if let Some(pos) = garbage {
            let entry = entries.remove(pos);
            debug!("window {} closed, entry {} removed", id, entry.id());
        }
    }

    /// Dock an entry; false on invalid state or synthesis failure
    pub async fn dock_entry(&self, id: EntryId) -> bool {
        match self.try_dock(id).await {
            Ok(()) => true,
            // misuse, the entry is left as it was
            Err(e) if e.is_invalid_transition() => {
                info!("dock_entry {} ignored: {}", id, e);
                false
            }
            Err(e) => {
                warn!("dock_entry {} failed: {}", id, e);
                false
            }
        }
    }

    /// Undock an entry; misuse and failures are only logged
    pub async fn undock_entry(&self, id: EntryId) {
        match self.try_undock(id).await {
            Ok(()) => {}
            Err(e) if e.is_invalid_transition() => info!("undock_entry {} ignored: {}", id, e),
            Err(e) => warn!("undock_entry {} failed: {}", id, e),
        }
    }

    async fn try_dock(&self, id: EntryId) -> DockResult<()> {
        let entry = self
            .entry(id)
            .await
            .ok_or_else(|| DockError::EntryNotFound(id.to_string()))?;

        entry.dock(&self.ctx).await?;

        let view = entry.view().await;
        info!("Docked {} ({})", view.name, view.identity);
        self.journal
            .record(JournalEvent::Docked {
                identity: view.identity,
                desktop_id: view.desktop_id,
            })
            .await;
        self.save_docked_apps().await;
        Ok(())
    }

    async fn try_undock(&self, id: EntryId) -> DockResult<()> {
        let entry = self
            .entry(id)
            .await
            .ok_or_else(|| DockError::EntryNotFound(id.to_string()))?;

        let outcome = entry.undock(&self.ctx).await?;

        let view = entry.view().await;
        info!("Undocked {} ({})", view.name, view.identity);
        self.journal
            .record(JournalEvent::Undocked {
                identity: view.identity,
            })
            .await;

        if outcome == UndockOutcome::Removed {
            self.remove_if_garbage(&entry).await;
        }
        self.save_docked_apps().await;
        Ok(())
    }

    /// Dock a descriptor file, creating a windowless entry if none matches
    ///
    /// Returns false when the descriptor is already docked or docking failed.
    pub async fn dock_descriptor(&self, path: &Path) -> DockResult<bool> {
        if self.docked_entry_by_path(path).await?.is_some() {
            warn!("{} is already docked", path.display());
            return Ok(false);
        }

        let descriptor = self
            .ctx
            .index
            .lookup_by_file(path)
            .await
            .ok_or_else(|| DockError::DescriptorNotFound(path.to_path_buf()))?;

        let entry = {
            let mut entries = self.entries.write().await;
            let mut found = None;
            for entry in entries.iter() {
                if entry.lock().await.identity == descriptor.identity {
                    found = Some(Arc::clone(entry));
                    break;
                }
            }
            match found {
                Some(entry) => entry,
                None => {
                    let identity = descriptor.identity.clone();
                    let state = EntryState::new(identity, Some(descriptor), None);
                    let entry = DockEntry::new(state);
                    entries.push(Arc::clone(&entry));
                    entry
                }
            }
        };

        let docked = self.dock_entry(entry.id()).await;
        if !docked {
            self.remove_if_garbage(&entry).await;
        }
        Ok(docked)
    }

    /// Undock whatever docked entry a descriptor file refers to
    pub async fn undock_descriptor(&self, path: &Path) -> DockResult<()> {
        let entry = self
            .docked_entry_by_path(path)
            .await?
            .ok_or_else(|| DockError::NotDocked(path.display().to_string()))?;
        self.try_undock(entry.id()).await
    }

    /// Whether a descriptor file refers to a docked entry
    pub async fn is_docked(&self, path: &Path) -> bool {
        matches!(self.docked_entry_by_path(path).await, Ok(Some(_)))
    }

    /// Find the docked entry for a descriptor file
    ///
    /// Matches the exact path first, then the descriptor's identity so the
    /// same application reached through another path is still found.
    pub async fn docked_entry_by_path(&self, path: &Path) -> DockResult<Option<Arc<DockEntry>>> {
        let docked = self.docked_entries().await;

        for (entry, descriptor) in &docked {
            if descriptor.path == path {
                return Ok(Some(Arc::clone(entry)));
            }
        }

        let identity = match self.ctx.index.lookup_by_file(path).await {
            Some(descriptor) => descriptor.identity,
            None if !path.exists() => return Err(DockError::DescriptorNotFound(path.to_path_buf())),
            None => {
                return Err(DockError::DescriptorInvalid {
                    path: path.to_path_buf(),
                    reason: "cannot be loaded".to_string(),
                })
            }
        };
        Ok(docked
            .into_iter()
            .find(|(_, descriptor)| descriptor.identity == identity)
            .map(|(entry, _)| entry))
    }

    async fn docked_entries(&self) -> Vec<(Arc<DockEntry>, Descriptor)> {
        let entries = self.entries.read().await;
        let mut docked = Vec::new();
        for entry in entries.iter() {
            let state = entry.lock().await;
            if let (true, Some(descriptor)) = (state.docked, &state.descriptor) {
                docked.push((Arc::clone(entry), descriptor.clone()));
            }
        }
        docked
    }

    /// Rewrite the pinned list from the currently docked entries
    ///
    /// Ids already pinned keep their order, new ones are appended.
    async fn save_docked_apps(&self) {
        let mut pinned = self.pinned.lock().await;

        let current: Vec<String> = self
            .docked_entries()
            .await
            .into_iter()
            .map(|(_, descriptor)| descriptor.desktop_id())
            .collect();

        let mut list: Vec<String> = pinned
            .iter()
            .filter(|id| current.contains(id))
            .cloned()
            .collect();
        for id in current {
            if !list.contains(&id) {
                list.push(id);
            }
        }

        if let Err(e) = self.settings.set_docked_apps(&list).await {
            warn!("Failed to save docked apps: {}", e);
        }
        *pinned = list;
    }

    async fn remove_if_garbage(&self, entry: &Arc<DockEntry>) {
        let mut entries = self.entries.write().await;
        // A window may have joined since the transition released the entry
        if !entry.lock().await.is_garbage() {
            return;
        }
        let before = entries.len();
        entries.retain(|e| e.id() != entry.id());
        if entries.len() != before {
            debug!("entry {} removed", entry.id());
            self.journal
                .record(JournalEvent::Removed { id: entry.id() })
                .await;
        }
    }

    pub async fn entry(&self, id: EntryId) -> Option<Arc<DockEntry>> {
        let entries = self.entries.read().await;
        entries.iter().find(|e| e.id() == id).cloned()
    }

    /// Entry currently holding a window
    pub async fn entry_for_window(&self, window: WindowId) -> Option<Arc<DockEntry>> {
        let entries = self.entries.read().await;
        for entry in entries.iter() {
            if entry.lock().await.holds_window(window) {
                return Some(Arc::clone(entry));
            }
        }
        None
    }

    /// Snapshot of every entry in collection order
    pub async fn entries(&self) -> Vec<EntryView> {
        let entries = self.entries.read().await;
        let mut views = Vec::with_capacity(entries.len());
        for entry in entries.iter() {
            views.push(entry.view().await);
        }
        views
    }

    /// Pinned list as last persisted
    pub async fn docked_apps(&self) -> Vec<String> {
        self.pinned.lock().await.clone()
    }

    /// Flush both identity caches
    pub async fn shutdown(&self) {
        self.ctx.resolver.flush().await;
    }
}
