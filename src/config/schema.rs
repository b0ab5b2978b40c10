//! Configuration schema for picset
//!
//! Configuration lives in a project-local `picset.toml`.

use crate::error::{PicsetError, PicsetResult};
use crate::sizes::Breakpoint;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output settings
    pub output: OutputConfig,

    /// Size planning settings
    pub sizes: SizesConfig,
}

/// Where rendered assets, the manifest, and the cache blob go
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory rendered assets are written under
    pub directory: PathBuf,

    /// Prefix prepended to asset names to form public URLs
    pub public_prefix: String,

    /// Cache blob filename, relative to the output directory
    pub cache_file: String,

    /// JPEG encoder quality, 1-100
    pub quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("dist/img"),
            public_prefix: "/img/".to_string(),
            cache_file: "picset-cache.json".to_string(),
            quality: 80,
        }
    }
}

/// Breakpoints, densities, and the consolidation tolerance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SizesConfig {
    /// Display pixel ratios to render for
    pub densities: Vec<f64>,

    /// Width consolidation tolerance, 0 < t <= 1
    pub threshold: f64,

    /// Layout breakpoints; exactly one must omit max_width (fallback)
    pub breakpoints: Vec<Breakpoint>,
}

impl Default for SizesConfig {
    fn default() -> Self {
        Self {
            densities: vec![1.0, 2.0],
            threshold: 0.8,
            breakpoints: vec![
                Breakpoint {
                    max_width: Some(600),
                    image_width: 300,
                },
                Breakpoint {
                    max_width: None,
                    image_width: 1200,
                },
            ],
        }
    }
}

impl Config {
    /// Check invariants the orchestrator relies on, with the config path
    /// in the error for context.
    pub fn validate(&self, path: &Path) -> PicsetResult<()> {
        let invalid = |reason: String| PicsetError::ConfigInvalid {
            path: path.to_path_buf(),
            reason,
        };

        if self.sizes.densities.is_empty() {
            return Err(invalid("sizes.densities must not be empty".to_string()));
        }
        if let Some(&bad) = self.sizes.densities.iter().find(|d| !(**d > 0.0)) {
            return Err(invalid(format!("density {bad} is not positive")));
        }
        if !(self.sizes.threshold > 0.0 && self.sizes.threshold <= 1.0) {
            return Err(invalid(format!(
                "sizes.threshold {} is outside (0, 1]",
                self.sizes.threshold
            )));
        }
        if self.sizes.breakpoints.is_empty() {
            return Err(invalid("sizes.breakpoints must not be empty".to_string()));
        }
        match self
            .sizes
            .breakpoints
            .iter()
            .filter(|b| b.is_fallback())
            .count()
        {
            1 => {}
            0 => {
                return Err(invalid(
                    "no fallback breakpoint (one entry must omit max_width)".to_string(),
                ))
            }
            n => return Err(invalid(format!("{n} fallback breakpoints, expected one"))),
        }
        if !(1..=100).contains(&self.output.quality) {
            return Err(invalid(format!(
                "output.quality {} is outside 1-100",
                self.output.quality
            )));
        }
        Ok(())
    }

    /// Path of the cache blob, relative to the output directory.
    pub fn cache_path(&self) -> PathBuf {
        self.output.directory.join(&self.output.cache_file)
    }
}
