//! Persistent identity caches
//!
//! Two independent [`KvCache`] instances back the dock:
//!
//! | Cache | Key | Value |
//! |-------|-----|-------|
//! | window identity | window-derived identity | descriptor identity chosen at dock time |
//! | descriptor path | identity | absolute descriptor path |
//!
//! Both are optimizations. Deleting either file loses no data, identity is
//! re-derived from windows and descriptors.

pub mod store;

pub use store::KvCache;
