//! Watch command - drive the dock from a JSON-lines event stream
//!
//! Each stdin line is one request:
//!
//! ```text
//! {"type":"opened","window":{"id":1,"title":"Notes","class":"Notes",...}}
//! {"type":"closed","id":1}
//! {"type":"dock","window":1}
//! {"type":"undock","window":1}
//! ```
//!
//! Dock and undock requests get a JSON reply line on stdout.

use crate::config::Config;
use crate::dock::DockManager;
use crate::error::{DockError, DockResult};
use crate::window::{WindowEvent, WindowId, WindowInfo};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Request {
    Opened { window: WindowInfo },
    Closed { id: WindowId },
    Dock { window: WindowId },
    Undock { window: WindowId },
}

/// Execute the watch command
pub async fn execute(config: &Config) -> DockResult<()> {
    let manager = DockManager::from_config(config).await?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| DockError::io("reading stdin", e))?
    {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<Request>(line) {
            Ok(request) => handle(&manager, request).await?,
            Err(e) => warn!("Ignoring malformed request: {}", e),
        }
    }

    debug!("stdin closed");
    manager.shutdown().await;
    Ok(())
}

async fn handle(manager: &DockManager, request: Request) -> DockResult<()> {
    match request {
        Request::Opened { window } => manager.handle_event(WindowEvent::Opened { window }).await,
        Request::Closed { id } => manager.handle_event(WindowEvent::Closed { id }).await,
        Request::Dock { window } => {
            let ok = match manager.entry_for_window(window).await {
                Some(entry) => manager.dock_entry(entry.id()).await,
                None => {
                    warn!("dock: no entry holds window {}", window);
                    false
                }
            };
            reply("dock", window, ok)?;
        }
        Request::Undock { window } => {
            let ok = match manager.entry_for_window(window).await {
                Some(entry) => {
                    let was_docked = entry.lock().await.docked;
                    manager.undock_entry(entry.id()).await;
                    was_docked
                }
                None => {
                    warn!("undock: no entry holds window {}", window);
                    false
                }
            };
            reply("undock", window, ok)?;
        }
    }
    Ok(())
}

fn reply(request: &str, window: WindowId, ok: bool) -> DockResult<()> {
    let line = serde_json::to_string(&serde_json::json!({
        "request": request,
        "window": window,
        "ok": ok,
    }))?;
    println!("{}", line);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dock_request() {
        let request: Request = serde_json::from_str(r#"{"type":"dock","window":4}"#).unwrap();
        assert!(matches!(request, Request::Dock { window: 4 }));
    }

    #[test]
    fn parses_window_events() {
        let request: Request = serde_json::from_str(
            r#"{"type":"opened","window":{"id":2,"title":"T","executable":"/bin/t","class":"T"}}"#,
        )
        .unwrap();
        assert!(matches!(request, Request::Opened { .. }));

        let request: Request = serde_json::from_str(r#"{"type":"closed","id":2}"#).unwrap();
        assert!(matches!(request, Request::Closed { id: 2 }));
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(serde_json::from_str::<Request>(r#"{"type":"launch","window":1}"#).is_err());
    }
}
