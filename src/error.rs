//! Error types for dockd
//!
//! All modules use `DockResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dockd operations
pub type DockResult<T> = Result<T, DockError>;

/// All errors that can occur in dockd
#[derive(Error, Debug)]
pub enum DockError {
    // Scratch descriptor errors
    #[error("Failed to create scratch directory {path}: {source}")]
    ScratchDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No launch command known for {0}")]
    NoLaunchCommand(String),

    #[error("Invalid descriptor {path}: {reason}")]
    DescriptorInvalid { path: PathBuf, reason: String },

    #[error("Descriptor not found: {0}")]
    DescriptorNotFound(PathBuf),

    // Entry state errors
    #[error("Entry {0} is already docked")]
    AlreadyDocked(String),

    #[error("Entry {0} is not docked")]
    NotDocked(String),

    #[error("Entry {0} has no descriptor")]
    NoDescriptor(String),

    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    #[error("Failed to dock {0}")]
    DockFailed(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl DockError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Check if the error is caller misuse rather than a system fault
    ///
    /// These are logged by the manager and never propagated to remote callers.
    pub fn is_invalid_transition(&self) -> bool {
        matches!(
            self,
            Self::AlreadyDocked(_) | Self::NotDocked(_) | Self::NoDescriptor(_)
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ScratchDirCreate { .. } => {
                Some("Check permissions on paths.scratch_dir in config.toml")
            }
            Self::ConfigInvalid { .. } => Some("Run: dockd config show"),
            Self::DescriptorNotFound(_) => Some("Pass the full path to a .desktop file"),
            Self::EntryNotFound(_) => Some("Run: dockd list --all"),
            Self::DockFailed(_) => Some("Run again with -v to see why"),
            _ => None,
        }
    }
}
