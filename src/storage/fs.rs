//! Local filesystem storage adapter

use crate::error::{PicsetError, PicsetResult};
use crate::storage::BlobStorage;
use async_trait::async_trait;
use std::path::Path;
use tokio::fs;

/// Default `BlobStorage` over the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FsBlobStorage;

impl FsBlobStorage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BlobStorage for FsBlobStorage {
    async fn write(&self, bytes: &[u8], path: &Path) -> PicsetResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| PicsetError::storage(parent, e))?;
        }
        fs::write(path, bytes)
            .await
            .map_err(|e| PicsetError::storage(path, e))
    }

    async fn read(&self, path: &Path) -> PicsetResult<Vec<u8>> {
        fs::read(path)
            .await
            .map_err(|e| PicsetError::storage(path, e))
    }

    async fn read_utf8(&self, path: &Path) -> PicsetResult<String> {
        fs::read_to_string(path)
            .await
            .map_err(|e| PicsetError::storage(path, e))
    }
}
