//! Image codec capability
//!
//! The transform seam between orchestration and actual pixel work. The
//! default adapter wraps the `image` crate; callers with their own
//! pipeline (external services, GPU encoders) implement [`ImageCodec`]
//! and inject it on the request.

mod raster;

pub use raster::RasterCodec;

use crate::error::PicsetResult;
use async_trait::async_trait;

/// Parameters for one transform invocation.
#[derive(Debug, Clone, Default)]
pub struct TransformRequest {
    /// Target pixel width; height follows the aspect when absent
    pub target_width: Option<u32>,

    /// Target pixel height; width follows the aspect when absent
    pub target_height: Option<u32>,

    /// Encoder quality (JPEG), 1-100
    pub quality: Option<u8>,

    /// Label to overlay on the output for visual debugging
    pub debug_overlay_text: Option<String>,
}

/// Result of one transform invocation.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// Encoded output bytes
    pub bytes: Vec<u8>,

    /// Output pixel width
    pub width: u32,

    /// Output pixel height
    pub height: u32,

    /// Output file extension without the dot, e.g. `jpg`
    pub format_extension: String,

    /// SHA-256 hex digest of the output bytes
    pub content_hash: String,
}

/// Transforms raw image bytes to a sized, encoded output.
#[async_trait]
pub trait ImageCodec: Send + Sync {
    /// Resize and re-encode `input` per `request`. Must fail with a
    /// codec error when output dimensions or format cannot be
    /// determined.
    async fn transform(
        &self,
        input: &[u8],
        request: &TransformRequest,
    ) -> PicsetResult<TransformOutput>;
}
