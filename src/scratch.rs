//! Scratch descriptor generator
//!
//! Entries docked without a usable installed descriptor get one synthesized
//! in a private scratch directory. For an id `<id>` the directory holds:
//!
//! - `<id>.desktop`: the descriptor
//! - `<id>.sh`: executable launch shim wrapping the launch command
//! - `<id>.png`: icon materialized from an inline `data:image` payload
//!
//! Synthesis is all-or-nothing: on failure every file written for the id is
//! removed before the error is returned. A complete descriptor already on
//! disk for the id is reused as is, never rewritten.

use crate::desktop::descriptor::{self, Descriptor};
use crate::error::{DockError, DockResult};
use base64::prelude::{Engine as _, BASE64_STANDARD};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Prefix identifying an inline image payload
const IMAGE_URI_PREFIX: &str = "data:image";

/// Extensions of every file a synthesized id may own
const SCRATCH_EXTENSIONS: &[&str] = &["desktop", "sh", "png", "desktop.tmp"];

/// What to synthesize a descriptor from
#[derive(Debug, Clone, Copy)]
pub struct SynthesisRequest<'a> {
    /// Scratch id, `docked:<identity>`
    pub id: &'a str,
    /// Display name, usually the window title
    pub title: &'a str,
    /// Icon name, path or `data:image` payload
    pub icon: &'a str,
    /// Original launch command
    pub command: Option<&'a str>,
    /// Existing descriptor to alias instead of fabricating
    pub installed: Option<&'a Path>,
}

/// Private directory of synthesized descriptors
#[derive(Debug, Clone)]
pub struct ScratchDir {
    dir: PathBuf,
    default_icon: String,
    #[cfg(test)]
    fail_links: bool,
}

impl ScratchDir {
    pub fn new(dir: impl Into<PathBuf>, default_icon: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            default_icon: default_icon.into(),
            #[cfg(test)]
            fail_links: false,
        }
    }

    /// Whether a descriptor was synthesized by us
    pub fn owns(&self, desc: &Descriptor) -> bool {
        desc.lives_in(&self.dir)
    }

    /// Descriptor path for a scratch id
    pub fn descriptor_path(&self, id: &str) -> PathBuf {
        self.file(id, "desktop")
    }

    fn file(&self, id: &str, ext: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, ext))
    }

    /// Synthesize a descriptor for `req.id`
    pub async fn synthesize(&self, req: SynthesisRequest<'_>) -> DockResult<Descriptor> {
        debug!("create scratch files for {}", req.id);
        self.ensure_dir().await?;

        if let Some(existing) = self.existing(req.id).await {
            debug!("reusing scratch descriptor {}", existing.path.display());
            return Ok(existing);
        }

        // Leftovers of an interrupted run must not leak into this one
        self.discard(req.id).await;

        if let Some(installed) = req.installed.filter(|p| p.is_file()) {
            return match self.alias(installed, req.id).await {
                Ok(desc) => Ok(desc),
                Err(e) => {
                    self.discard(req.id).await;
                    Err(e)
                }
            };
        }

        match self.fabricate(&req).await {
            Ok(desc) => Ok(desc),
            Err(e) => {
                self.discard(req.id).await;
                Err(e)
            }
        }
    }

    /// Remove every file owned by a scratch id. Missing files are fine.
    pub async fn discard(&self, id: &str) {
        for ext in SCRATCH_EXTENSIONS {
            let path = self.file(id, ext);
            match fs::remove_file(&path).await {
                Ok(()) => debug!("removed scratch file {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove scratch file {}: {}", path.display(), e),
            }
        }
    }

    /// Complete descriptor already synthesized for `id`, if any
    async fn existing(&self, id: &str) -> Option<Descriptor> {
        let path = self.descriptor_path(id);
        if !path.is_file() {
            return None;
        }
        let desc = Descriptor::load(&path).await.ok()?;

        // a fabricated descriptor is only usable with its launch script
        let script = self.file(id, "sh");
        if desc.exec.starts_with(&*script.to_string_lossy()) && !script.is_file() {
            return None;
        }
        Some(desc)
    }

    async fn ensure_dir(&self) -> DockResult<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DockError::ScratchDirCreate {
                path: self.dir.clone(),
                source: e,
            })?;

        // Set restrictive permissions
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            fs::set_permissions(&self.dir, perms)
                .await
                .map_err(|e| DockError::ScratchDirCreate {
                    path: self.dir.clone(),
                    source: e,
                })?;
        }

        Ok(())
    }

    /// Point the scratch descriptor at the same bytes as `source`
    async fn alias(&self, source: &Path, id: &str) -> DockResult<Descriptor> {
        let target = self.descriptor_path(id);
        if let Err(e) = self.hard_link(source, &target).await {
            debug!("link {} failed ({}), copying instead", source.display(), e);
            copy_file(source, &target).await?;
        }
        Descriptor::load(&target).await
    }

    async fn hard_link(&self, source: &Path, target: &Path) -> std::io::Result<()> {
        #[cfg(test)]
        if self.fail_links {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "hard links disabled",
            ));
        }
        fs::hard_link(source, target).await
    }

    async fn fabricate(&self, req: &SynthesisRequest<'_>) -> DockResult<Descriptor> {
        let command = req
            .command
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| DockError::NoLaunchCommand(req.id.to_string()))?;

        let icon = self.materialize_icon(req.id, req.icon).await;

        let script = self.file(req.id, "sh");
        write_file(&script, format!("#!/bin/sh\n{}", command).as_bytes(), 0o744).await?;

        let name = if req.title.is_empty() { req.id } else { req.title };
        let exec = format!("{} %U", script.display());
        let content = descriptor::render(name, &exec, &icon);

        // Descriptor last, renamed into place so readers never see half a file
        let target = self.descriptor_path(req.id);
        let staging = self.file(req.id, "desktop.tmp");
        write_file(&staging, content.as_bytes(), 0o644).await?;
        fs::rename(&staging, &target)
            .await
            .map_err(|e| DockError::io(format!("renaming {}", staging.display()), e))?;

        Descriptor::parse(&target, content.as_bytes())
    }

    /// Icon reference for the descriptor, writing inline payloads to disk
    async fn materialize_icon(&self, id: &str, icon: &str) -> String {
        if icon.is_empty() {
            return self.default_icon.clone();
        }
        if !icon.starts_with(IMAGE_URI_PREFIX) {
            return icon.to_string();
        }

        let bytes = match decode_image_uri(icon) {
            Ok(bytes) => bytes,
            Err(reason) => {
                warn!("Unusable icon payload for {}: {}", id, reason);
                return self.default_icon.clone();
            }
        };

        let path = self.file(id, "png");
        match write_file(&path, &bytes, 0o644).await {
            Ok(()) => path.display().to_string(),
            Err(e) => {
                warn!("Failed to write icon for {}: {}", id, e);
                self.default_icon.clone()
            }
        }
    }
}

/// Decode a `data:image/...;base64,<payload>` URI
fn decode_image_uri(uri: &str) -> Result<Vec<u8>, String> {
    let (header, payload) = uri
        .split_once(',')
        .ok_or_else(|| "missing ',' separator".to_string())?;
    if !header.ends_with(";base64") {
        return Err(format!("unsupported encoding in {:?}", header));
    }
    let bytes = BASE64_STANDARD
        .decode(payload.trim())
        .map_err(|e| e.to_string())?;
    if bytes.is_empty() {
        return Err("empty payload".to_string());
    }
    Ok(bytes)
}

async fn write_file(path: &Path, bytes: &[u8], mode: u32) -> DockResult<()> {
    fs::write(path, bytes)
        .await
        .map_err(|e| DockError::io(format!("writing {}", path.display()), e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
            .await
            .map_err(|e| DockError::io(format!("setting permissions on {}", path.display()), e))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(())
}

async fn copy_file(source: &Path, target: &Path) -> DockResult<()> {
    fs::copy(source, target).await.map_err(|e| {
        DockError::io(
            format!("copying {} to {}", source.display(), target.display()),
            e,
        )
    })?;
    Ok(())
}
