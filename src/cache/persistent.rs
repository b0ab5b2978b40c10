//! JSON-blob-backed cache store
//!
//! A `DedupCache` persisted as a single flat string-to-string JSON object.
//! The blob is fetched lazily on first use and memoized; persistence
//! failures are reported through the observer and recovered locally, so
//! data availability always wins over durability.

use crate::cache::flight::FlightMap;
use crate::cache::{DedupCache, ValueFactory};
use crate::error::{PicsetError, PicsetResult};
use crate::storage::BlobStorage;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Observes persistence lifecycle events.
///
/// `on_update` fires after every successful `set` or completed
/// `get_or_create`; the default write-through behavior persists
/// immediately. Return `false` to batch updates and call
/// [`PersistentCacheStore::save`] explicitly.
pub trait StoreObserver: Send + Sync {
    /// An entry resolved (`value` present) or was removed (`value`
    /// absent). Return true to persist the blob now.
    fn on_update(&self, key: &str, value: Option<&str>) -> bool {
        let _ = (key, value);
        true
    }

    /// The blob could not be read or parsed; the store continues with an
    /// empty map.
    fn on_load_error(&self, error: &PicsetError) {
        warn!("Cache load failed, starting empty: {}", error);
    }

    /// The blob could not be written; in-memory entries remain usable.
    fn on_save_error(&self, error: &PicsetError) {
        warn!("Cache save failed, in-memory entries remain usable: {}", error);
    }
}

/// Default observer: write-through persistence, failures logged.
#[derive(Debug, Default)]
pub struct WriteThroughObserver;

impl StoreObserver for WriteThroughObserver {}

/// A `DedupCache` backed by one JSON document of string-to-string pairs.
pub struct PersistentCacheStore {
    storage: Arc<dyn BlobStorage>,
    path: PathBuf,
    flight: FlightMap,
    loaded: Mutex<bool>,
    observer: Box<dyn StoreObserver>,
}

impl PersistentCacheStore {
    /// Create a store over `path` with write-through persistence.
    pub fn new(storage: Arc<dyn BlobStorage>, path: impl Into<PathBuf>) -> Self {
        Self::with_observer(storage, path, Box::new(WriteThroughObserver))
    }

    /// Create a store with a custom persistence observer.
    pub fn with_observer(
        storage: Arc<dyn BlobStorage>,
        path: impl Into<PathBuf>,
        observer: Box<dyn StoreObserver>,
    ) -> Self {
        Self {
            storage,
            path: path.into(),
            flight: FlightMap::new(),
            loaded: Mutex::new(false),
            observer,
        }
    }

    /// Path of the persisted blob.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize the resolved entries back to the blob. Still-pending and
    /// removed keys are dropped. Failure is reported via the observer,
    /// never returned.
    pub async fn save(&self) {
        let entries = self.flight.resolved().await;
        let result = async {
            let body = serde_json::to_string_pretty(&entries)?;
            self.storage
                .write(body.as_bytes(), &self.path)
                .await
                .map_err(|e| PicsetError::cache_save(e.to_string()))
        }
        .await;

        match result {
            Ok(()) => debug!(entries = entries.len(), "Persisted cache blob"),
            Err(err) => self.observer.on_save_error(&err),
        }
    }

    /// Drop the memoized map and re-read the blob on next access.
    pub async fn reload(&self) {
        let mut loaded = self.loaded.lock().await;
        *loaded = false;
    }

    /// Snapshot of the resolved entries (loading the blob first if
    /// needed). Used by cache inspection tooling.
    pub async fn entries(&self) -> std::collections::BTreeMap<String, String> {
        self.ensure_loaded().await;
        self.flight.resolved().await
    }

    /// Load the blob once; later calls reuse the in-memory map until
    /// `reload`. Every load failure is recovered to an empty map via the
    /// observer, so this never blocks or fails a request.
    async fn ensure_loaded(&self) {
        let mut loaded = self.loaded.lock().await;
        if *loaded {
            return;
        }

        match self.read_blob().await {
            Ok(entries) => {
                debug!(entries = entries.len(), "Loaded cache blob");
                self.flight.replace_resolved(entries).await;
            }
            Err(err) => {
                self.observer.on_load_error(&err);
                self.flight.replace_resolved(HashMap::new()).await;
            }
        }
        *loaded = true;
    }

    async fn read_blob(&self) -> PicsetResult<HashMap<String, String>> {
        let body = self
            .storage
            .read_utf8(&self.path)
            .await
            .map_err(|e| PicsetError::cache_load(e.to_string()))?;

        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| PicsetError::cache_load(format!("malformed JSON: {e}")))?;

        let object = value
            .as_object()
            .ok_or_else(|| PicsetError::cache_load("cache blob is not a JSON object"))?;

        let mut entries = HashMap::with_capacity(object.len());
        for (key, value) in object {
            let value = value.as_str().ok_or_else(|| {
                PicsetError::cache_load(format!("non-string value for key {key}"))
            })?;
            entries.insert(key.clone(), value.to_string());
        }
        Ok(entries)
    }
}

#[async_trait]
impl DedupCache for PersistentCacheStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.ensure_loaded().await;
        self.flight.get(key).await
    }

    async fn set(&self, key: &str, value: Option<String>) {
        self.ensure_loaded().await;
        self.flight.set(key, value.clone()).await;
        if self.observer.on_update(key, value.as_deref()) {
            self.save().await;
        }
    }

    async fn get_or_create(&self, key: &str, factory: ValueFactory<'_>) -> PicsetResult<String> {
        self.ensure_loaded().await;
        let (value, created) = self.flight.get_or_create(key, factory).await?;
        if created && self.observer.on_update(key, Some(&value)) {
            self.save().await;
        }
        Ok(value)
    }
}
