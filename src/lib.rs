//! picset - Responsive Image Set Generation
//!
//! Turns layout breakpoints and pixel-density multipliers into a minimal
//! set of rendered image widths, memoized through a content-addressed,
//! single-flight cache.

pub mod cache;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod orchestration;
pub mod sizes;
pub mod storage;

pub use error::{PicsetError, PicsetResult};
