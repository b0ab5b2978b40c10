//! Init command - create project-local picset.toml

use crate::cli::args::InitArgs;
use crate::error::{PicsetError, PicsetResult};
use console::style;
use std::path::Path;
use tokio::fs;

/// Template for project-local config
const INIT_TEMPLATE: &str = r#"# picset project configuration
# Rendered assets, the manifest, and the transform cache live under
# [output].directory.

[output]
# directory = "dist/img"
# public_prefix = "/img/"
# cache_file = "picset-cache.json"
# quality = 80

[sizes]
# densities = [1.0, 2.0]
# threshold = 0.8        # 1.0 disables width merging

[[sizes.breakpoints]]
max_width = 600
image_width = 300

# The fallback breakpoint has no max_width
[[sizes.breakpoints]]
image_width = 1200
"#;

/// Execute the init command
pub async fn execute(args: InitArgs) -> PicsetResult<()> {
    let target_dir = match args.path {
        Some(ref p) => p.clone(),
        None => std::env::current_dir()
            .map_err(|e| PicsetError::io("getting current directory", e))?,
    };

    let config_path = target_dir.join("picset.toml");

    if config_path.exists() && !args.force {
        return Err(PicsetError::User(format!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        )));
    }

    ensure_dir(&target_dir).await?;

    fs::write(&config_path, INIT_TEMPLATE)
        .await
        .map_err(|e| PicsetError::io(format!("writing {}", config_path.display()), e))?;

    println!(
        "{} Created project config at {}",
        style("✓").green().bold(),
        config_path.display()
    );

    Ok(())
}

async fn ensure_dir(dir: &Path) -> PicsetResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .await
            .map_err(|e| PicsetError::io(format!("creating directory {}", dir.display()), e))?;
    }
    Ok(())
}
