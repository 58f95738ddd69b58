//! Windowing-system boundary
//!
//! The dock never talks to a window manager directly. Whatever bridges the
//! compositor feeds [`WindowEvent`]s carrying a [`WindowInfo`] snapshot.

use crate::identity::IdentityKey;
use serde::{Deserialize, Serialize};

/// Window handle assigned by the windowing system
pub type WindowId = u64;

/// Metadata snapshot of a live window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub id: WindowId,

    /// Window title
    #[serde(default)]
    pub title: String,

    /// Icon name, path or `data:image/...` payload
    #[serde(default)]
    pub icon: String,

    /// Command line that launched the owning process
    #[serde(default)]
    pub command: Option<String>,

    /// Executable path of the owning process
    #[serde(default)]
    pub executable: String,

    /// Window class signature (WM_CLASS or equivalent)
    #[serde(default)]
    pub class: String,

    /// Native application reference, usually a desktop id
    #[serde(default)]
    pub app_id: Option<String>,
}

impl WindowInfo {
    /// Identity derived from stable window properties
    pub fn identity(&self) -> IdentityKey {
        IdentityKey::from_window(&self.executable, &self.class)
    }

    /// Title shown for the window, falling back to its class
    pub fn display_name(&self) -> &str {
        if self.title.is_empty() {
            &self.class
        } else {
            &self.title
        }
    }
}

/// Window lifecycle notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WindowEvent {
    Opened { window: WindowInfo },
    Closed { id: WindowId },
}
