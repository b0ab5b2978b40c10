//! Error types for picset
//!
//! All modules use `PicsetResult<T>` as their return type.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Result type alias for picset operations
pub type PicsetResult<T> = Result<T, PicsetError>;

/// All errors that can occur in picset
#[derive(Error, Debug)]
pub enum PicsetError {
    // Input errors
    #[error("Input image not found: {0}")]
    InputImageMissing(PathBuf),

    #[error("No fallback breakpoint (max_width = none) in request")]
    MissingFallbackBreakpoint,

    #[error("Expected exactly one fallback breakpoint, found {0}")]
    MultipleFallbackBreakpoints(usize),

    #[error("Size threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("Pixel density must be positive, got {0}")]
    InvalidDensity(f64),

    #[error("Request has no pixel densities")]
    NoPixelDensities,

    #[error("No consolidated size for {nominal_width}@{density}")]
    ConsolidationMiss { nominal_width: u32, density: f64 },

    // Codec errors
    #[error("Codec error: {0}")]
    Codec(String),

    // Storage errors
    #[error("Storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Cache persistence errors (recovered locally, reported via hooks)
    #[error("Failed to load cache: {reason}")]
    CacheLoad { reason: String },

    #[error("Failed to save cache: {reason}")]
    CacheSave { reason: String },

    /// Failure broadcast to callers that joined an in-flight computation
    #[error("{0}")]
    Shared(Arc<PicsetError>),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl PicsetError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a codec error
    pub fn codec(reason: impl Into<String>) -> Self {
        Self::Codec(reason.into())
    }

    /// Create a storage error
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a cache load error
    pub fn cache_load(reason: impl Into<String>) -> Self {
        Self::CacheLoad {
            reason: reason.into(),
        }
    }

    /// Create a cache save error
    pub fn cache_save(reason: impl Into<String>) -> Self {
        Self::CacheSave {
            reason: reason.into(),
        }
    }

    /// Whether the error is recovered locally instead of propagating to
    /// the request caller. A failed cache load falls back to an empty
    /// map; after a failed save the in-memory map stays authoritative.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::CacheLoad { .. } | Self::CacheSave { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PicsetError::MissingFallbackBreakpoint;
        assert!(err.to_string().contains("fallback breakpoint"));
    }

    #[test]
    fn error_recoverable() {
        assert!(PicsetError::cache_load("bad blob").is_recoverable());
        assert!(PicsetError::cache_save("disk full").is_recoverable());
        assert!(!PicsetError::codec("no dimensions").is_recoverable());
    }

    #[test]
    fn shared_error_forwards_display() {
        let inner = Arc::new(PicsetError::codec("no dimensions"));
        let shared = PicsetError::Shared(inner);
        assert!(shared.to_string().contains("no dimensions"));
    }
}
