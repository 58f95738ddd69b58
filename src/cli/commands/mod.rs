//! CLI command implementations

pub mod cache;
pub mod config;
pub mod dock;
pub mod list;
pub mod watch;

pub use cache::execute as cache;
pub use config::execute as config;
pub use dock::{dock, undock};
pub use list::execute as list;
pub use watch::execute as watch;
