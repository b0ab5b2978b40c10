//! picset - Responsive Image Set Generation
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use picset::cli::{Cli, Commands};
use picset::config::ConfigManager;
use picset::error::PicsetResult;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> PicsetResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("picset=warn"),
        1 => EnvFilter::new("picset=info"),
        _ => EnvFilter::new("picset=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        // Init and completions don't need config loading
        Commands::Init(args) => picset::cli::commands::init(args).await,
        Commands::Completions(args) => {
            picset::cli::commands::completions(args);
            Ok(())
        }
        Commands::Generate(args) => {
            let config = load_config(cli.config).await?;
            picset::cli::commands::generate(args, &config).await
        }
        Commands::Cache(args) => {
            let config = load_config(cli.config).await?;
            picset::cli::commands::cache(args, &config).await
        }
    }
}

async fn load_config(path: Option<PathBuf>) -> PicsetResult<picset::config::Config> {
    let manager = match path {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };
    manager.load().await
}
