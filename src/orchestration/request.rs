//! Resize request configuration
//!
//! All collaborators are explicit strategy objects on the request: the
//! shared dedup cache, blob storage, codec, and output naming. The
//! constructor fills in the default adapters; `with_*` methods override.

use crate::cache::DedupCache;
use crate::codec::{ImageCodec, RasterCodec};
use crate::orchestration::naming::{HashedNamer, OutputNamer};
use crate::sizes::Breakpoint;
use crate::storage::{BlobStorage, FsBlobStorage};
use std::path::PathBuf;
use std::sync::Arc;

/// Source of the input image bytes.
#[derive(Debug, Clone)]
pub enum ImageInput {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// One image-set generation request.
pub struct ResizeRequest {
    /// Shared transform cache; outlives the request and may serve many
    /// concurrent requests, which is what makes single-flight matter
    pub cache: Arc<dyn DedupCache>,
    pub storage: Arc<dyn BlobStorage>,
    pub codec: Arc<dyn ImageCodec>,
    pub namer: Arc<dyn OutputNamer>,

    /// Directory rendered assets are written under
    pub output_dir: PathBuf,

    /// Prefix prepended to output names to form public URLs
    pub public_prefix: String,

    /// Await transforms one at a time in enumeration order instead of
    /// dispatching them all concurrently; output is identical either way
    pub sequential: bool,

    /// Width consolidation tolerance, 0 < t <= 1
    pub size_threshold: f64,

    pub input: ImageInput,
    pub pixel_densities: Vec<f64>,
    pub breakpoints: Vec<Breakpoint>,

    /// Encoder quality passed through to the codec
    pub quality: Option<u8>,

    /// Tag every transform with a size label for visual debugging; the
    /// label participates in the cache key
    pub debug_labels: bool,
}

impl ResizeRequest {
    /// Create a request with default adapters (filesystem storage,
    /// raster codec, hashed naming) and defaults of `1x`/`2x` densities
    /// at threshold 0.8.
    pub fn new(
        input: ImageInput,
        breakpoints: Vec<Breakpoint>,
        cache: Arc<dyn DedupCache>,
    ) -> Self {
        Self {
            cache,
            storage: Arc::new(FsBlobStorage::new()),
            codec: Arc::new(RasterCodec::new()),
            namer: Arc::new(HashedNamer),
            output_dir: PathBuf::from("."),
            public_prefix: "/".to_string(),
            sequential: false,
            size_threshold: 0.8,
            input,
            pixel_densities: vec![1.0, 2.0],
            breakpoints,
            quality: None,
            debug_labels: false,
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_public_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.public_prefix = prefix.into();
        self
    }

    pub fn with_densities(mut self, densities: Vec<f64>) -> Self {
        self.pixel_densities = densities;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.size_threshold = threshold;
        self
    }

    pub fn with_sequential(mut self, sequential: bool) -> Self {
        self.sequential = sequential;
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_debug_labels(mut self, debug_labels: bool) -> Self {
        self.debug_labels = debug_labels;
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn BlobStorage>) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_codec(mut self, codec: Arc<dyn ImageCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_namer(mut self, namer: Arc<dyn OutputNamer>) -> Self {
        self.namer = namer;
        self
    }
}
