//! Dock and undock commands - pin or unpin a descriptor file

use crate::cli::args::DescriptorArgs;
use crate::config::Config;
use crate::dock::DockManager;
use crate::error::{DockError, DockResult};
use console::style;

/// Execute the dock command
pub async fn dock(args: DescriptorArgs, config: &Config) -> DockResult<()> {
    let manager = DockManager::from_config(config).await?;
    let path = absolute(&args.path)?;

    if manager.is_docked(&path).await {
        println!(
            "{} {} is already docked",
            style("!").yellow(),
            style(path.display()).cyan()
        );
        return Ok(());
    }

    if !manager.dock_descriptor(&path).await? {
        return Err(DockError::DockFailed(path.display().to_string()));
    }
    manager.shutdown().await;

    println!("{} Docked {}", style("✓").green(), style(path.display()).cyan());
    Ok(())
}

/// Execute the undock command
pub async fn undock(args: DescriptorArgs, config: &Config) -> DockResult<()> {
    let manager = DockManager::from_config(config).await?;
    let path = absolute(&args.path)?;

    manager.undock_descriptor(&path).await?;
    manager.shutdown().await;

    println!("{} Undocked {}", style("✓").green(), style(path.display()).cyan());
    Ok(())
}

fn absolute(path: &std::path::Path) -> DockResult<std::path::PathBuf> {
    std::path::absolute(path)
        .map_err(|e| DockError::io(format!("resolving {}", path.display()), e))
}
