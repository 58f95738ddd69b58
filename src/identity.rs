//! Identity keys naming what a dock entry represents
//!
//! Keys are content hashes so they survive restarts unchanged as long as the
//! underlying window properties or descriptor bytes do.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Prefix of keys derived from live window properties
pub const WINDOW_PREFIX: &str = "w:";

/// Prefix of keys derived from descriptor contents
pub const DESCRIPTOR_PREFIX: &str = "d:";

/// Prefix of synthesized descriptor ids in the scratch directory
pub const SCRATCH_PREFIX: &str = "docked:";

/// Opaque, stable identity of a dock entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Derive a key from stable window properties
    pub fn from_window(executable: &str, class: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(executable.as_bytes());
        hasher.update([0u8]);
        hasher.update(class.as_bytes());
        Self(format!("{}{}", WINDOW_PREFIX, short_hash(hasher)))
    }

    /// Derive a key from the raw bytes of a descriptor file
    pub fn from_descriptor(contents: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(contents);
        Self(format!("{}{}", DESCRIPTOR_PREFIX, short_hash(hasher)))
    }

    /// Rebuild a key from its persisted string form
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.starts_with(WINDOW_PREFIX) || raw.starts_with(DESCRIPTOR_PREFIX) {
            Some(Self(raw.to_string()))
        } else {
            None
        }
    }

    /// Whether the key was computed from window properties
    pub fn is_window_derived(&self) -> bool {
        self.0.starts_with(WINDOW_PREFIX)
    }

    /// Descriptor id used for a scratch descriptor synthesized for this key
    pub fn scratch_id(&self) -> String {
        format!("{}{}", SCRATCH_PREFIX, self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// First 8 bytes of the digest, hex encoded
fn short_hash(hasher: Sha256) -> String {
    let result = hasher.finalize();
    hex::encode(&result[..8])
}
