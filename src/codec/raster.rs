//! Default raster codec over the `image` crate
//!
//! Decode, Lanczos3 resize, JPEG/PNG re-encode, SHA-256 content hash.
//! Decoding and encoding are CPU-bound and run under `spawn_blocking`.

use crate::codec::{ImageCodec, TransformOutput, TransformRequest};
use crate::error::{PicsetError, PicsetResult};
use async_trait::async_trait;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use sha2::{Digest, Sha256};
use std::io::Cursor;
use tracing::debug;

const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Default `ImageCodec` implementation.
#[derive(Debug, Clone, Default)]
pub struct RasterCodec;

impl RasterCodec {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ImageCodec for RasterCodec {
    async fn transform(
        &self,
        input: &[u8],
        request: &TransformRequest,
    ) -> PicsetResult<TransformOutput> {
        let input = input.to_vec();
        let request = request.clone();

        tokio::task::spawn_blocking(move || transform_blocking(&input, &request))
            .await
            .map_err(|e| PicsetError::Internal(format!("codec task failed: {e}")))?
    }
}

fn transform_blocking(input: &[u8], request: &TransformRequest) -> PicsetResult<TransformOutput> {
    let format = image::guess_format(input)
        .map_err(|e| PicsetError::codec(format!("cannot determine input format: {e}")))?;
    let decoded = image::load_from_memory(input)
        .map_err(|e| PicsetError::codec(format!("cannot decode input: {e}")))?;

    let (source_width, source_height) = decoded.dimensions();
    if source_width == 0 || source_height == 0 {
        return Err(PicsetError::codec("input has zero dimensions"));
    }

    let (width, height) = target_dimensions(
        source_width,
        source_height,
        request.target_width,
        request.target_height,
    );

    let resized = if (width, height) == (source_width, source_height) {
        decoded
    } else {
        decoded.resize_exact(width, height, FilterType::Lanczos3)
    };

    if let Some(label) = &request.debug_overlay_text {
        // No font stack here; custom codecs may rasterize the label.
        debug!("Debug overlay requested but not rendered: {}", label);
    }

    let (bytes, extension) = encode(&resized, format, request.quality)?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let content_hash = hex::encode(hasher.finalize());

    Ok(TransformOutput {
        bytes,
        width,
        height,
        format_extension: extension.to_string(),
        content_hash,
    })
}

/// Resolve output dimensions, preserving aspect when only one side is
/// pinned.
fn target_dimensions(
    source_width: u32,
    source_height: u32,
    target_width: Option<u32>,
    target_height: Option<u32>,
) -> (u32, u32) {
    let ratio = f64::from(source_height) / f64::from(source_width);
    match (target_width, target_height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, (f64::from(w) * ratio).round().max(1.0) as u32),
        (None, Some(h)) => ((f64::from(h) / ratio).round().max(1.0) as u32, h),
        (None, None) => (source_width, source_height),
    }
}

fn encode(
    image: &DynamicImage,
    source_format: ImageFormat,
    quality: Option<u8>,
) -> PicsetResult<(Vec<u8>, &'static str)> {
    let mut bytes = Vec::new();
    match source_format {
        ImageFormat::Png => {
            image
                .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
                .map_err(|e| PicsetError::codec(format!("PNG encode failed: {e}")))?;
            Ok((bytes, "png"))
        }
        // Everything else re-encodes as JPEG
        _ => {
            let quality = quality.unwrap_or(DEFAULT_JPEG_QUALITY);
            let rgb = image.to_rgb8();
            let mut encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, quality);
            encoder
                .encode_image(&rgb)
                .map_err(|e| PicsetError::codec(format!("JPEG encode failed: {e}")))?;
            Ok((bytes, "jpg"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(
            width,
            height,
            Rgb([120u8, 90, 60]),
        ));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn jpeg_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(
            width,
            height,
            Rgb([120u8, 90, 60]),
        ));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
            .unwrap();
        bytes
    }

    #[test]
    fn dimensions_preserve_aspect_from_width() {
        assert_eq!(target_dimensions(800, 600, Some(400), None), (400, 300));
        assert_eq!(target_dimensions(800, 450, Some(799), None), (799, 449));
    }

    #[test]
    fn dimensions_preserve_aspect_from_height() {
        assert_eq!(target_dimensions(800, 600, None, Some(300)), (400, 300));
    }

    #[test]
    fn dimensions_pass_through_without_targets() {
        assert_eq!(target_dimensions(800, 600, None, None), (800, 600));
    }

    #[test]
    fn dimensions_never_collapse_to_zero() {
        assert_eq!(target_dimensions(4000, 1, Some(2), None), (2, 1));
    }

    #[tokio::test]
    async fn resizes_png_to_target_width() {
        let codec = RasterCodec::new();
        let request = TransformRequest {
            target_width: Some(32),
            ..Default::default()
        };

        let output = codec.transform(&png_fixture(64, 48), &request).await.unwrap();

        assert_eq!(output.width, 32);
        assert_eq!(output.height, 24);
        assert_eq!(output.format_extension, "png");
        assert_eq!(output.content_hash.len(), 64);
        assert!(!output.bytes.is_empty());
    }

    #[tokio::test]
    async fn jpeg_input_stays_jpeg() {
        let codec = RasterCodec::new();
        let request = TransformRequest {
            target_width: Some(20),
            quality: Some(70),
            ..Default::default()
        };

        let output = codec
            .transform(&jpeg_fixture(40, 40), &request)
            .await
            .unwrap();

        assert_eq!(output.format_extension, "jpg");
        assert_eq!((output.width, output.height), (20, 20));
    }

    #[tokio::test]
    async fn content_hash_is_deterministic() {
        let codec = RasterCodec::new();
        let request = TransformRequest {
            target_width: Some(16),
            ..Default::default()
        };
        let input = png_fixture(64, 48);

        let a = codec.transform(&input, &request).await.unwrap();
        let b = codec.transform(&input, &request).await.unwrap();

        assert_eq!(a.content_hash, b.content_hash);
    }

    #[tokio::test]
    async fn undecodable_input_is_codec_error() {
        let codec = RasterCodec::new();
        let err = codec
            .transform(b"not an image", &TransformRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PicsetError::Codec(_)));
    }
}
