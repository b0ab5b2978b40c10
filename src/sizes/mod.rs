//! Size planning for responsive image sets
//!
//! Expands layout breakpoints and pixel-density multipliers into the set
//! of pixel widths to actually render, merging near-duplicate widths so
//! nearly-equal targets share one rendered asset.

pub mod consolidate;

pub use consolidate::{consolidate, size_key, Breakpoint, ConsolidatedSizes, SizeSpec};
