//! Blob storage capability
//!
//! Byte-level read/write of named paths. Rendered assets and the cache
//! blob go through this seam, so callers can point output at something
//! other than the local filesystem (or interpose their own writer).

mod fs;

pub use fs::FsBlobStorage;

use crate::error::PicsetResult;
use async_trait::async_trait;
use std::path::Path;

/// Abstract byte storage with directory creation on write.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Write `bytes` to `path`, creating intermediate directories.
    async fn write(&self, bytes: &[u8], path: &Path) -> PicsetResult<()>;

    /// Read the raw bytes at `path`.
    async fn read(&self, path: &Path) -> PicsetResult<Vec<u8>>;

    /// Read `path` as UTF-8 text.
    async fn read_utf8(&self, path: &Path) -> PicsetResult<String>;
}
