//! Dock entries and their dock/undock transitions
//!
//! An entry is in one of three retained states: undocked with a window,
//! docked without a window, docked with a window. Undocked and windowless
//! entries are garbage and dropped by the manager.
//!
//! Each entry carries its own lock; a dock or undock holds it for the whole
//! transition, so at most one transition per entry is in flight.

use crate::desktop::{AppIndex, Descriptor};
use crate::dock::resolver::IdentityResolver;
use crate::error::{DockError, DockResult};
use crate::identity::IdentityKey;
use crate::scratch::{ScratchDir, SynthesisRequest};
use crate::window::{WindowId, WindowInfo};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

/// Handle naming an entry for the lifetime of the process
pub type EntryId = Uuid;

/// Observable entry state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryStatus {
    UndockedWithWindow,
    DockedWithoutWindow,
    DockedWithWindow,
    /// Undocked and windowless, pending removal
    Garbage,
}

/// Actions offered in the entry's menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MenuAction {
    Launch,
    Dock,
    Undock,
    CloseAll,
}

/// What an undock left behind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndockOutcome {
    /// Entry still has windows and stays in the dock
    Undocked,
    /// Entry has no window left and must be removed
    Removed,
}

/// Collaborators a transition needs
pub struct DockContext {
    pub(crate) index: Arc<dyn AppIndex>,
    pub(crate) scratch: ScratchDir,
    pub(crate) resolver: IdentityResolver,
}

impl DockContext {
    pub fn new(index: Arc<dyn AppIndex>, scratch: ScratchDir, resolver: IdentityResolver) -> Self {
        Self {
            index,
            scratch,
            resolver,
        }
    }

    /// Whether a descriptor can back a docked entry as is
    async fn is_available(&self, descriptor: &Descriptor) -> bool {
        if self.scratch.owns(descriptor) {
            return descriptor.path.is_file();
        }
        self.index
            .lookup_by_desktop_id(&descriptor.desktop_id())
            .await
            .is_some()
    }
}

/// Mutable part of an entry, guarded by the entry lock
#[derive(Debug, Clone)]
pub struct EntryState {
    pub identity: IdentityKey,
    pub windows: Vec<WindowInfo>,
    pub descriptor: Option<Descriptor>,
    pub docked: bool,
    pub name: String,
    pub icon: String,
    pub menu: Vec<MenuAction>,
}

impl EntryState {
    pub fn new(
        identity: IdentityKey,
        descriptor: Option<Descriptor>,
        window: Option<WindowInfo>,
    ) -> Self {
        let mut state = Self {
            identity,
            windows: window.into_iter().collect(),
            descriptor,
            docked: false,
            name: String::new(),
            icon: String::new(),
            menu: Vec::new(),
        };
        state.refresh();
        state
    }

    /// Most recently attached window
    pub fn current_window(&self) -> Option<&WindowInfo> {
        self.windows.last()
    }

    pub fn has_window(&self) -> bool {
        !self.windows.is_empty()
    }

    pub fn status(&self) -> EntryStatus {
        match (self.docked, self.has_window()) {
            (true, true) => EntryStatus::DockedWithWindow,
            (true, false) => EntryStatus::DockedWithoutWindow,
            (false, true) => EntryStatus::UndockedWithWindow,
            (false, false) => EntryStatus::Garbage,
        }
    }

    pub fn is_garbage(&self) -> bool {
        self.status() == EntryStatus::Garbage
    }

    pub fn holds_window(&self, id: WindowId) -> bool {
        self.windows.iter().any(|w| w.id == id)
    }

    /// Attach a window, replacing an older snapshot of the same window
    pub fn attach_window(&mut self, window: WindowInfo) {
        self.windows.retain(|w| w.id != window.id);
        self.windows.push(window);
        self.refresh();
    }

    /// Detach a window; returns whether it was attached
    pub fn detach_window(&mut self, id: WindowId) -> bool {
        let before = self.windows.len();
        self.windows.retain(|w| w.id != id);
        let removed = self.windows.len() != before;
        if removed {
            self.refresh();
        }
        removed
    }

    /// Recompute display name, icon and menu
    pub fn refresh(&mut self) {
        let window = self.current_window();
        let (name, icon) = match (&self.descriptor, window) {
            (Some(desc), _) => (desc.name.clone(), desc.icon.clone()),
            (None, Some(w)) => (w.display_name().to_string(), w.icon.clone()),
            (None, None) => (self.identity.to_string(), String::new()),
        };
        self.name = name;
        self.icon = icon;

        let mut menu = Vec::new();
        if self.descriptor.is_some() || self.launch_command().is_some() {
            menu.push(MenuAction::Launch);
        }
        menu.push(if self.docked {
            MenuAction::Undock
        } else {
            MenuAction::Dock
        });
        if self.has_window() {
            menu.push(MenuAction::CloseAll);
        }
        self.menu = menu;
    }

    /// Command used to launch the entry's application
    pub fn launch_command(&self) -> Option<String> {
        if let Some(cmd) = self.current_window().and_then(|w| w.command.as_deref()) {
            return Some(cmd.to_string());
        }
        self.descriptor
            .as_ref()
            .map(|d| strip_field_codes(&d.exec))
            .filter(|c| !c.is_empty())
    }
}

/// Remove `%f`-style field codes from a descriptor command line
fn strip_field_codes(exec: &str) -> String {
    exec.split_whitespace()
        .filter(|token| !(token.len() == 2 && token.starts_with('%')))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Read-only view of an entry for listing
#[derive(Debug, Clone, Serialize)]
pub struct EntryView {
    pub id: EntryId,
    pub identity: String,
    pub status: EntryStatus,
    pub name: String,
    pub icon: String,
    pub desktop_id: Option<String>,
    pub descriptor_path: Option<PathBuf>,
    pub windows: Vec<WindowId>,
    pub menu: Vec<MenuAction>,
}

/// A dock entry: stable handle plus locked state
#[derive(Debug)]
pub struct DockEntry {
    id: EntryId,
    state: Mutex<EntryState>,
}

impl DockEntry {
    pub fn new(state: EntryState) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            state: Mutex::new(state),
        })
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Acquire the entry lock
    pub async fn lock(&self) -> MutexGuard<'_, EntryState> {
        self.state.lock().await
    }

    pub async fn view(&self) -> EntryView {
        let state = self.lock().await;
        EntryView {
            id: self.id,
            identity: state.identity.to_string(),
            status: state.status(),
            name: state.name.clone(),
            icon: state.icon.clone(),
            desktop_id: state.descriptor.as_ref().map(Descriptor::desktop_id),
            descriptor_path: state.descriptor.as_ref().map(|d| d.path.clone()),
            windows: state.windows.iter().map(|w| w.id).collect(),
            menu: state.menu.clone(),
        }
    }

    /// Pin the entry, synthesizing a scratch descriptor when needed
    pub async fn dock(&self, ctx: &DockContext) -> DockResult<()> {
        let mut state = self.lock().await;

        if state.docked {
            return Err(DockError::AlreadyDocked(state.identity.to_string()));
        }

        let needs_scratch = match &state.descriptor {
            None => true,
            Some(desc) => !ctx.is_available(desc).await,
        };
        debug!("dock {}: need scratch descriptor? {}", state.identity, needs_scratch);

        if needs_scratch {
            let id = state.identity.scratch_id();
            let window = state.current_window();
            let title = window
                .map(|w| w.display_name().to_string())
                .or_else(|| state.descriptor.as_ref().map(|d| d.name.clone()))
                .unwrap_or_default();
            let icon = window
                .map(|w| w.icon.clone())
                .filter(|i| !i.is_empty())
                .or_else(|| state.descriptor.as_ref().map(|d| d.icon.clone()))
                .unwrap_or_default();
            let command = state.launch_command();
            let installed = state.descriptor.as_ref().map(|d| d.path.clone());

            let descriptor = ctx
                .scratch
                .synthesize(SynthesisRequest {
                    id: &id,
                    title: &title,
                    icon: &icon,
                    command: command.as_deref(),
                    installed: installed.as_deref(),
                })
                .await?;

            let previous = std::mem::replace(&mut state.identity, descriptor.identity.clone());
            debug!("dock: {} now uses identity {}", previous, state.identity);
            ctx.resolver.remember(&previous, &descriptor).await;
            state.descriptor = Some(descriptor);
        }

        state.docked = true;
        state.refresh();
        Ok(())
    }

    /// Unpin the entry, dropping its scratch descriptor if it had one
    pub async fn undock(&self, ctx: &DockContext) -> DockResult<UndockOutcome> {
        let mut state = self.lock().await;

        if !state.docked {
            return Err(DockError::NotDocked(state.identity.to_string()));
        }
        let Some(descriptor) = state.descriptor.clone() else {
            return Err(DockError::NoDescriptor(state.identity.to_string()));
        };

        state.docked = false;

        if ctx.scratch.owns(&descriptor) {
            ctx.scratch.discard(&descriptor.desktop_id()).await;
            ctx.resolver.forget_path(&descriptor.identity).await;

            // The descriptor backing the identity is gone, identify again
            if let Some(window) = state.current_window().cloned() {
                let resolution = ctx.resolver.identify(&window).await;
                state.identity = resolution.identity;
                state.descriptor = resolution.descriptor;
            }
        }

        state.refresh();
        if state.has_window() {
            Ok(UndockOutcome::Undocked)
        } else {
            Ok(UndockOutcome::Removed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn window(id: WindowId) -> WindowInfo {
        WindowInfo {
            id,
            title: "Scratchpad".to_string(),
            icon: "text-x-generic".to_string(),
            command: Some("/opt/pad/pad --new".to_string()),
            executable: "/opt/pad/pad".to_string(),
            class: "Pad".to_string(),
            app_id: None,
        }
    }

    fn descriptor() -> Descriptor {
        Descriptor::parse(
            Path::new("/apps/pad.desktop"),
            b"[Desktop Entry]\nName=Pad\nIcon=pad\nExec=pad %F\n",
        )
        .unwrap()
    }

    #[test]
    fn status_follows_flags() {
        let w = window(1);
        let mut state = EntryState::new(w.identity(), None, Some(w));
        assert_eq!(state.status(), EntryStatus::UndockedWithWindow);

        state.docked = true;
        assert_eq!(state.status(), EntryStatus::DockedWithWindow);

        assert!(state.detach_window(1));
        assert_eq!(state.status(), EntryStatus::DockedWithoutWindow);

        state.docked = false;
        assert!(state.is_garbage());
    }

    #[test]
    fn metadata_prefers_descriptor() {
        let w = window(1);
        let mut state = EntryState::new(w.identity(), None, Some(w));
        assert_eq!(state.name, "Scratchpad");
        assert_eq!(state.icon, "text-x-generic");

        state.descriptor = Some(descriptor());
        state.refresh();
        assert_eq!(state.name, "Pad");
        assert_eq!(state.icon, "pad");
    }

    #[test]
    fn menu_tracks_state() {
        let w = window(1);
        let mut state = EntryState::new(w.identity(), None, Some(w));
        assert_eq!(
            state.menu,
            vec![MenuAction::Launch, MenuAction::Dock, MenuAction::CloseAll]
        );

        state.docked = true;
        state.detach_window(1);
        assert_eq!(state.menu, vec![MenuAction::Launch, MenuAction::Undock]);
    }

    #[test]
    fn attach_replaces_same_window() {
        let mut state = EntryState::new(window(1).identity(), None, Some(window(1)));
        let mut updated = window(1);
        updated.title = "Renamed".to_string();
        state.attach_window(updated);
        state.attach_window(window(2));

        assert_eq!(state.windows.len(), 2);
        assert_eq!(state.current_window().unwrap().id, 2);
        assert!(!state.detach_window(9));
    }

    #[test]
    fn launch_command_falls_back_to_descriptor() {
        let state = EntryState::new(descriptor().identity, Some(descriptor()), None);
        assert_eq!(state.launch_command().as_deref(), Some("pad"));

        let w = window(1);
        let state = EntryState::new(w.identity(), Some(descriptor()), Some(w));
        assert_eq!(state.launch_command().as_deref(), Some("/opt/pad/pad --new"));
    }

    #[test]
    fn field_codes_are_stripped() {
        assert_eq!(strip_field_codes("app --flag %U"), "app --flag");
        assert_eq!(strip_field_codes("%f"), "");
        assert_eq!(strip_field_codes("app --level=%50"), "app --level=%50");
    }
}
