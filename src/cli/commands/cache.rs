//! Cache command - inspect or clear the identity caches

use crate::cache::KvCache;
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::{Config, ConfigManager};
use crate::error::DockResult;
use console::style;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> DockResult<()> {
    let caches = [
        ("window identity", KvCache::new(ConfigManager::window_cache_path(config), false)),
        ("descriptor path", KvCache::new(ConfigManager::path_cache_path(config), false)),
    ];

    match args.action {
        CacheAction::Show { format } => show(&caches, format).await,
        CacheAction::Clear => {
            for (label, cache) in &caches {
                cache.clear().await?;
                println!("{} Cleared {} cache", style("✓").green(), label);
            }
            Ok(())
        }
    }
}

async fn show(caches: &[(&str, KvCache)], format: OutputFormat) -> DockResult<()> {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::Map::new();
            for (label, cache) in caches {
                let map: serde_json::Map<String, serde_json::Value> = cache
                    .entries()
                    .await
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::String(v)))
                    .collect();
                out.insert(label.replace(' ', "_"), serde_json::Value::Object(map));
            }
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Plain => {
            for (_, cache) in caches {
                for (key, value) in cache.entries().await {
                    println!("{}\t{}", key, value);
                }
            }
        }
        OutputFormat::Table => {
            for (label, cache) in caches {
                let entries = cache.entries().await;
                println!(
                    "{} ({})",
                    style(label).bold(),
                    style(cache.path().display()).dim()
                );
                if entries.is_empty() {
                    println!("  (empty)");
                }
                for (key, value) in entries {
                    println!("  {:<20} {}", key, value);
                }
                println!();
            }
        }
    }
    Ok(())
}
