//! In-memory cache store
//!
//! Single-flight semantics without persistence. Useful on its own for
//! one-shot batch runs and as the test double for the persistent store.

use crate::cache::flight::FlightMap;
use crate::cache::{DedupCache, ValueFactory};
use crate::error::PicsetResult;
use async_trait::async_trait;

/// A `DedupCache` holding entries only for the lifetime of the process.
pub struct MemoryCacheStore {
    flight: FlightMap,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self {
            flight: FlightMap::new(),
        }
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DedupCache for MemoryCacheStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.flight.get(key).await
    }

    async fn set(&self, key: &str, value: Option<String>) {
        self.flight.set(key, value).await;
    }

    async fn get_or_create(&self, key: &str, factory: ValueFactory<'_>) -> PicsetResult<String> {
        let (value, _created) = self.flight.get_or_create(key, factory).await?;
        Ok(value)
    }
}
