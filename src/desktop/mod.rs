//! Application descriptors and the installed-application index

pub mod descriptor;
pub mod index;

pub use descriptor::Descriptor;
pub use index::{AppIndex, DirAppIndex};
