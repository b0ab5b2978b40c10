//! Cache command - inspect and clear the transform cache

use crate::cache::PersistentCacheStore;
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::error::{PicsetError, PicsetResult};
use crate::orchestration::RenderedAsset;
use crate::storage::FsBlobStorage;
use console::style;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::fs;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> PicsetResult<()> {
    match args.action {
        CacheAction::Show { format } => show(config, format).await,
        CacheAction::Clear { yes } => clear(config, yes).await,
    }
}

/// List cache entries
async fn show(config: &Config, format: OutputFormat) -> PicsetResult<()> {
    let path = config.cache_path();
    if !path.exists() {
        println!("Cache is empty.");
        return Ok(());
    }

    let store = PersistentCacheStore::new(Arc::new(FsBlobStorage::new()), path);
    let entries = store.entries().await;

    if entries.is_empty() {
        println!("Cache is empty.");
        return Ok(());
    }

    match format {
        OutputFormat::Table => {
            println!("{:<8} {:<8} {}", "WIDTH", "HEIGHT", "SRC");
            println!("{}", "-".repeat(64));
            for (key, value) in &entries {
                match serde_json::from_str::<RenderedAsset>(value) {
                    Ok(asset) => {
                        println!("{:<8} {:<8} {}", asset.width, asset.height, asset.src)
                    }
                    Err(_) => println!("{:<8} {:<8} {}", "?", "?", key),
                }
            }
            println!();
            println!("{} entries", style(entries.len()).bold());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }

    Ok(())
}

/// Delete the cache blob
async fn clear(config: &Config, yes: bool) -> PicsetResult<()> {
    let path = config.cache_path();
    if !path.exists() {
        println!("No cache blob at {}", path.display());
        return Ok(());
    }

    if !yes {
        print!("Delete {}? [y/N] ", path.display());
        io::stdout()
            .flush()
            .map_err(|e| PicsetError::io("flushing stdout", e))?;
        let mut answer = String::new();
        io::stdin()
            .read_line(&mut answer)
            .map_err(|e| PicsetError::io("reading confirmation", e))?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    fs::remove_file(&path)
        .await
        .map_err(|e| PicsetError::io(format!("removing {}", path.display()), e))?;

    println!(
        "{} Cleared cache at {}",
        style("✓").green().bold(),
        path.display()
    );
    Ok(())
}
