//! dockd - Dock entry identity and docking lifecycle
//!
//! Decides what a docked application is, keeps that decision stable across
//! restarts, and reconciles it with live windows.

pub mod cache;
pub mod cli;
pub mod config;
pub mod desktop;
pub mod dock;
pub mod error;
pub mod identity;
pub mod journal;
pub mod scratch;
pub mod window;

pub use error::{DockError, DockResult};
