//! Image set data model
//!
//! The output structure mirrors `<picture>` markup: one source per
//! non-fallback breakpoint, the fallback's srcset as `img`, and the
//! aspect ratio of the widest rendered asset.

use serde::{Deserialize, Serialize};

/// One rendered output file; also the value stored per cache entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedAsset {
    /// Public URL of the asset
    pub src: String,

    /// Rendered pixel width
    pub width: u32,

    /// Rendered pixel height
    pub height: u32,
}

/// One srcset entry. `dpi` is the density actually achieved, which can
/// differ from the requested density when consolidation collapses
/// several requested sizes onto one rendered asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSetAsset {
    pub src: String,
    pub dpi: f64,
}

/// Srcset for one non-fallback breakpoint, scoped to its max width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSetSource {
    /// Max viewport width the source applies to
    pub w: u32,
    pub srcset: Vec<ImageSetAsset>,
}

/// The assembled responsive image set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSet {
    pub sources: Vec<ImageSetSource>,

    /// Fallback breakpoint's srcset
    pub img: Vec<ImageSetAsset>,

    /// width / height of the widest rendered asset, 5 decimal places
    pub aspect: f64,
}

/// Achieved density: floored to 2 decimal places.
pub(crate) fn floor2(value: f64) -> f64 {
    (value * 100.0).floor() / 100.0
}

/// Aspect ratio: rounded to 5 decimal places.
pub(crate) fn round5(value: f64) -> f64 {
    (value * 100_000.0).round() / 100_000.0
}
