//! Dock journal
//!
//! One JSON line per lifecycle event, e.g.
//!
//! ```text
//! {"timestamp":"2026-10-18T09:12:44Z","event":"entry.docked","identity":"d:3f9a..",...}
//! ```
//!
//! The file is opened on the first event and kept open; writes go through a
//! lock so lines from concurrent transitions never interleave.

use crate::config::Config;
use crate::dock::EntryId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

/// Lifecycle event recorded in the journal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum JournalEvent {
    #[serde(rename = "entry.docked")]
    Docked {
        identity: String,
        desktop_id: Option<String>,
    },
    #[serde(rename = "entry.undocked")]
    Undocked { identity: String },
    #[serde(rename = "entry.removed")]
    Removed { id: EntryId },
}

/// Journal line: an event and when it happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: JournalEvent,
}

/// Append-only JSON-lines journal; a no-op when disabled in config
#[derive(Debug)]
pub struct DockJournal {
    path: Option<PathBuf>,
    file: Mutex<Option<File>>,
}

impl DockJournal {
    pub fn new(config: &Config) -> Self {
        Self {
            path: config
                .general
                .journal
                .then(|| config.paths.journal_file.clone()),
            file: Mutex::new(None),
        }
    }

    /// Record an event. Failures are logged, never returned.
    pub async fn record(&self, event: JournalEvent) {
        let Some(path) = &self.path else {
            return;
        };

        let record = JournalRecord {
            timestamp: Utc::now(),
            event,
        };
        let mut line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to serialize journal record: {}", e);
                return;
            }
        };
        line.push('\n');

        let mut file = self.file.lock().await;
        if file.is_none() {
            match open(path).await {
                Ok(opened) => *file = Some(opened),
                Err(e) => {
                    warn!("Failed to open journal {}: {}", path.display(), e);
                    return;
                }
            }
        }
        if let Some(handle) = file.as_mut() {
            let written = match handle.write_all(line.as_bytes()).await {
                Ok(()) => handle.flush().await,
                Err(e) => Err(e),
            };
            if let Err(e) = written {
                warn!("Failed to write journal {}: {}", path.display(), e);
                // reopen on the next event
                *file = None;
            }
        }
    }
}

async fn open(path: &std::path::Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    OpenOptions::new().create(true).append(true).open(path).await
}
