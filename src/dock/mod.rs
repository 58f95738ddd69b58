//! Dock entries, identity resolution and the dock manager

pub mod entry;
pub mod manager;
pub mod resolver;
pub mod settings;

pub use entry::{DockContext, DockEntry, EntryId, EntryState, EntryStatus, EntryView, MenuAction};
pub use manager::DockManager;
pub use resolver::{IdentityResolver, Resolution};
pub use settings::{DockSettings, FileSettings};
