//! Application descriptor parsing
//!
//! Descriptors are key/value files with a `[Desktop Entry]` group. Only the
//! keys the dock needs are read; everything else is ignored.

use crate::error::{DockError, DockResult};
use crate::identity::IdentityKey;
use std::path::{Path, PathBuf};

const DESKTOP_GROUP: &str = "[Desktop Entry]";

/// Parsed application descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    /// Absolute path of the descriptor file
    pub path: PathBuf,

    /// Display name (`Name=`)
    pub name: String,

    /// Icon reference (`Icon=`), possibly empty
    pub icon: String,

    /// Command line (`Exec=`), possibly empty
    pub exec: String,

    /// Identity derived from the file contents
    pub identity: IdentityKey,
}

impl Descriptor {
    /// Read and parse a descriptor file
    pub async fn load(path: &Path) -> DockResult<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DockError::DescriptorNotFound(path.to_path_buf())
            } else {
                DockError::io(format!("reading descriptor {}", path.display()), e)
            }
        })?;
        Self::parse(path, &bytes)
    }

    /// Parse descriptor bytes that live (or will live) at `path`
    pub fn parse(path: &Path, bytes: &[u8]) -> DockResult<Self> {
        let invalid = |reason: &str| DockError::DescriptorInvalid {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let content = std::str::from_utf8(bytes).map_err(|_| invalid("not valid UTF-8"))?;

        let mut in_group = false;
        let mut seen_group = false;
        let mut name = None;
        let mut icon = String::new();
        let mut exec = String::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') {
                in_group = line == DESKTOP_GROUP;
                seen_group |= in_group;
                continue;
            }
            if !in_group {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            // Localized variants like Name[de] are skipped
            match key.trim() {
                "Name" => name = Some(value.trim().to_string()),
                "Icon" => icon = value.trim().to_string(),
                "Exec" => exec = value.trim().to_string(),
                _ => {}
            }
        }

        if !seen_group {
            return Err(invalid("missing [Desktop Entry] group"));
        }
        let name = name.ok_or_else(|| invalid("missing Name key"))?;

        Ok(Self {
            path: path.to_path_buf(),
            name,
            icon,
            exec,
            identity: IdentityKey::from_descriptor(bytes),
        })
    }

    /// Descriptor id: the file name without its `.desktop` extension
    pub fn desktop_id(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Whether the descriptor file sits directly inside `dir`
    pub fn lives_in(&self, dir: &Path) -> bool {
        self.path.parent() == Some(dir)
    }
}

/// Render a descriptor file in the format the dock writes
pub fn render(name: &str, exec: &str, icon: &str) -> String {
    format!(
        "{DESKTOP_GROUP}\nName={name}\nExec={exec}\nIcon={icon}\n\
         Type=Application\nTerminal=false\nStartupNotify=false\n"
    )
}
