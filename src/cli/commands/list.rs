//! List command - show docked entries
//!
//! A one-shot process sees no windows, so what it lists is exactly the
//! pinned list as restored on start. Live windows only show up under `watch`.

use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::Config;
use crate::dock::{DockManager, EntryStatus, EntryView};
use crate::error::DockResult;
use console::style;

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Config) -> DockResult<()> {
    let manager = DockManager::from_config(config).await?;
    let entries = manager.entries().await;

    if entries.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => println!("No docked entries"),
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&entries),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Plain => print_plain(&entries),
    }

    Ok(())
}

fn print_table(entries: &[EntryView]) {
    println!(
        "{:<24} {:<12} {:<20} {}",
        style("NAME").bold(),
        style("STATUS").bold(),
        style("IDENTITY").bold(),
        style("DESCRIPTOR").bold()
    );
    println!("{}", "-".repeat(80));

    for entry in entries {
        let status = match entry.status {
            EntryStatus::DockedWithWindow => style("running").green(),
            EntryStatus::DockedWithoutWindow => style("docked").cyan(),
            EntryStatus::UndockedWithWindow => style("window").yellow(),
            EntryStatus::Garbage => style("garbage").dim(),
        };
        let descriptor = entry
            .descriptor_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<24} {:<12} {:<20} {}",
            entry.name, status, entry.identity, descriptor
        );
    }

    println!();
    println!("{} entr{}", entries.len(), if entries.len() == 1 { "y" } else { "ies" });
}

fn print_plain(entries: &[EntryView]) {
    for entry in entries {
        println!(
            "{}",
            entry.desktop_id.as_deref().unwrap_or(entry.identity.as_str())
        );
    }
}
