//! Content-addressed transform cache
//!
//! A key-value store that memoizes the result of each expensive per-size
//! transform and guarantees at most one computation per key even under
//! concurrent invocation. The store instance outlives any single request
//! and may be shared across unrelated concurrent requests.
//!
//! # Single-flight
//!
//! `get_or_create` registers a pending placeholder for the key before the
//! factory runs, so every caller arriving during execution joins the same
//! in-flight computation instead of starting a second one. On failure the
//! placeholder is cleared entirely; a later call retries fully.

mod flight;
pub mod memory;
pub mod persistent;

pub use memory::MemoryCacheStore;
pub use persistent::{PersistentCacheStore, StoreObserver, WriteThroughObserver};

use crate::error::PicsetResult;
use async_trait::async_trait;
use futures_util::future::BoxFuture;

/// Factory future producing the value for a cache key.
///
/// Futures are lazy: passing one by value costs nothing unless the caller
/// becomes the owner of the in-flight slot and polls it.
pub type ValueFactory<'a> = BoxFuture<'a, PicsetResult<String>>;

/// A deduplicating key-value store with single-flight creation.
#[async_trait]
pub trait DedupCache: Send + Sync {
    /// Look up the resolved value for `key`. If a computation is in
    /// flight for the key, awaits its completion rather than returning a
    /// half-built value; a failed computation reads as absent.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store `value` directly (no factory, no single-flight, last write
    /// wins); `None` removes the key.
    async fn set(&self, key: &str, value: Option<String>);

    /// Return the value for `key`, running `factory` to create it if
    /// absent. For any set of concurrent callers on the same key the
    /// factory executes exactly once; all callers observe the same
    /// outcome, including failure. A failed factory clears the key so a
    /// subsequent call retries fully.
    async fn get_or_create(&self, key: &str, factory: ValueFactory<'_>) -> PicsetResult<String>;
}
