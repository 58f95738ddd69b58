//! dockd - Dock entry identity and docking service
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use dockd::cli::{Cli, Commands};
use dockd::config::ConfigManager;
use dockd::error::DockResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> DockResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    // 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("dockd=warn"),
        1 => EnvFilter::new("dockd=info"),
        _ => EnvFilter::new("dockd=debug"),
    };

    // Logs go to stderr so `watch` replies stay machine readable
    if config.general.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Watch => dockd::cli::commands::watch(&config).await,
        Commands::List(args) => dockd::cli::commands::list(args, &config).await,
        Commands::Dock(args) => dockd::cli::commands::dock(args, &config).await,
        Commands::Undock(args) => dockd::cli::commands::undock(args, &config).await,
        Commands::Cache(args) => dockd::cli::commands::cache(args, &config).await,
        Commands::Config(args) => {
            dockd::cli::commands::config(args, &config, &config_manager).await
        }
    }
}
