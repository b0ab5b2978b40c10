//! Generate command - render a responsive image set

use crate::cache::PersistentCacheStore;
use crate::cli::args::GenerateArgs;
use crate::config::Config;
use crate::error::{PicsetError, PicsetResult};
use crate::orchestration::{process, ImageInput, ResizeRequest};
use crate::storage::FsBlobStorage;
use console::style;
use std::sync::Arc;
use tokio::fs;
use tracing::info;

/// Execute the generate command
pub async fn execute(args: GenerateArgs, config: &Config) -> PicsetResult<()> {
    let output_dir = args
        .out
        .clone()
        .unwrap_or_else(|| config.output.directory.clone());
    let public_prefix = args
        .prefix
        .clone()
        .unwrap_or_else(|| config.output.public_prefix.clone());

    let storage = Arc::new(FsBlobStorage::new());
    let cache = Arc::new(PersistentCacheStore::new(
        storage.clone(),
        output_dir.join(&config.output.cache_file),
    ));

    let request = ResizeRequest::new(
        ImageInput::Path(args.input.clone()),
        config.sizes.breakpoints.clone(),
        cache,
    )
    .with_storage(storage)
    .with_output_dir(&output_dir)
    .with_public_prefix(public_prefix)
    .with_densities(config.sizes.densities.clone())
    .with_threshold(config.sizes.threshold)
    .with_quality(config.output.quality)
    .with_sequential(args.sequential)
    .with_debug_labels(args.debug_labels);

    info!(
        input = %args.input.display(),
        output = %output_dir.display(),
        "Generating image set"
    );

    let outcome = process(&request).await?;

    let manifest = serde_json::to_string_pretty(&outcome.image_set)?;
    let summary = format!(
        "{} generated, {} cached",
        style(outcome.generated).green().bold(),
        style(outcome.cached).cyan()
    );

    match &args.manifest {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    PicsetError::io(format!("creating directory {}", parent.display()), e)
                })?;
            }
            fs::write(path, &manifest)
                .await
                .map_err(|e| PicsetError::io(format!("writing manifest {}", path.display()), e))?;
            println!("Wrote manifest to {}", path.display());
            println!("{summary}");
        }
        None => {
            println!("{manifest}");
            eprintln!("{summary}");
        }
    }

    Ok(())
}
