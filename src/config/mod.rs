//! Configuration management for picset

pub mod schema;

pub use schema::{Config, OutputConfig, SizesConfig};

use crate::error::{PicsetError, PicsetResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Default config filename, discovered in the working directory
pub const CONFIG_FILE: &str = "picset.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a config manager over `picset.toml` in the working directory
    pub fn new() -> Self {
        Self {
            config_path: PathBuf::from(CONFIG_FILE),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Load configuration, falling back to defaults when the file does
    /// not exist
    pub async fn load(&self) -> PicsetResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            let config = Config::default();
            config.validate(&self.config_path)?;
            return Ok(config);
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> PicsetResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| PicsetError::io(format!("reading config from {}", path.display()), e))?;

        let config: Config = toml::from_str(&content).map_err(|e| PicsetError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate(path)?;
        Ok(config)
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("nonexistent.toml"));

        let config = manager.load().await.unwrap();
        assert_eq!(config.sizes.threshold, 0.8);
    }

    #[tokio::test]
    async fn load_parses_and_validates() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("picset.toml");
        std::fs::write(
            &path,
            r#"
            [sizes]
            threshold = 0.9
            densities = [1.0, 2.0, 3.0]
            "#,
        )
        .unwrap();

        let config = ConfigManager::with_path(path).load().await.unwrap();
        assert_eq!(config.sizes.threshold, 0.9);
        assert_eq!(config.sizes.densities.len(), 3);
    }

    #[tokio::test]
    async fn load_rejects_invalid_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("picset.toml");
        std::fs::write(
            &path,
            r#"
            [sizes]
            threshold = 2.0
            "#,
        )
        .unwrap();

        let err = ConfigManager::with_path(path).load().await.unwrap_err();
        assert!(matches!(err, PicsetError::ConfigInvalid { .. }));
    }

    #[tokio::test]
    async fn load_rejects_malformed_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("picset.toml");
        std::fs::write(&path, "not [ valid toml").unwrap();

        let err = ConfigManager::with_path(path).load().await.unwrap_err();
        assert!(matches!(err, PicsetError::ConfigInvalid { .. }));
    }
}
