//! Per-key single-flight map
//!
//! The shared core of both cache stores. Each key holds either a resolved
//! value or a pending placeholder carrying a broadcast channel; joiners
//! subscribe to the placeholder and the owner broadcasts the outcome once.
//! The map lock is only held for slot bookkeeping, never across factory
//! execution, so creation is serialized per key rather than globally.

use crate::cache::ValueFactory;
use crate::error::{PicsetError, PicsetResult};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

type FlightOutcome = Result<String, Arc<PicsetError>>;

enum Slot {
    Resolved(String),
    /// In-flight computation; the tag identifies the owning call so a
    /// concurrent `set` can supersede it without the owner clobbering
    /// the newer value on completion.
    Pending(u64, broadcast::Sender<FlightOutcome>),
}

enum Claim {
    Hit(String),
    Join(broadcast::Receiver<FlightOutcome>),
    Owner(u64, broadcast::Sender<FlightOutcome>),
}

pub(crate) struct FlightMap {
    slots: Mutex<HashMap<String, Slot>>,
    next_tag: AtomicU64,
}

impl FlightMap {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            next_tag: AtomicU64::new(0),
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let mut rx = {
            let slots = self.slots.lock().await;
            match slots.get(key) {
                None => return None,
                Some(Slot::Resolved(value)) => return Some(value.clone()),
                Some(Slot::Pending(_, tx)) => tx.subscribe(),
            }
        };

        match rx.recv().await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(_)) => None,
            // Owner vanished without broadcasting; a direct `set` may
            // have resolved the slot in the meantime.
            Err(_) => self.resolved_value(key).await,
        }
    }

    pub async fn set(&self, key: &str, value: Option<String>) {
        let mut slots = self.slots.lock().await;
        match value {
            Some(value) => {
                slots.insert(key.to_string(), Slot::Resolved(value));
            }
            None => {
                slots.remove(key);
            }
        }
    }

    /// Single-flight lookup-or-create. The boolean is true when this call
    /// owned the factory run (a fresh computation, not a hit or join).
    pub async fn get_or_create(
        &self,
        key: &str,
        factory: ValueFactory<'_>,
    ) -> PicsetResult<(String, bool)> {
        let claim = {
            let mut slots = self.slots.lock().await;
            match slots.get(key) {
                Some(Slot::Resolved(value)) => Claim::Hit(value.clone()),
                Some(Slot::Pending(_, tx)) => Claim::Join(tx.subscribe()),
                None => {
                    let tag = self.next_tag.fetch_add(1, Ordering::Relaxed);
                    let (tx, _) = broadcast::channel(1);
                    slots.insert(key.to_string(), Slot::Pending(tag, tx.clone()));
                    Claim::Owner(tag, tx)
                }
            }
        };

        match claim {
            Claim::Hit(value) => Ok((value, false)),
            Claim::Join(mut rx) => match rx.recv().await {
                Ok(Ok(value)) => Ok((value, false)),
                Ok(Err(shared)) => Err(PicsetError::Shared(shared)),
                Err(_) => match self.resolved_value(key).await {
                    Some(value) => Ok((value, false)),
                    None => Err(PicsetError::Internal(format!(
                        "in-flight cache entry for {key} abandoned"
                    ))),
                },
            },
            Claim::Owner(tag, tx) => match factory.await {
                Ok(value) => {
                    self.finish(key, tag, Some(value.clone())).await;
                    let _ = tx.send(Ok(value.clone()));
                    Ok((value, true))
                }
                Err(err) => {
                    self.finish(key, tag, None).await;
                    let shared = Arc::new(err);
                    let _ = tx.send(Err(shared.clone()));
                    Err(PicsetError::Shared(shared))
                }
            },
        }
    }

    /// Snapshot of resolved entries, sorted by key.
    pub async fn resolved(&self) -> BTreeMap<String, String> {
        let slots = self.slots.lock().await;
        slots
            .iter()
            .filter_map(|(key, slot)| match slot {
                Slot::Resolved(value) => Some((key.clone(), value.clone())),
                Slot::Pending(..) => None,
            })
            .collect()
    }

    /// Replace all resolved entries, leaving in-flight slots untouched.
    pub async fn replace_resolved(&self, entries: HashMap<String, String>) {
        let mut slots = self.slots.lock().await;
        slots.retain(|_, slot| matches!(slot, Slot::Pending(..)));
        for (key, value) in entries {
            slots.entry(key).or_insert(Slot::Resolved(value));
        }
    }

    /// Resolve or clear the owner's pending slot, unless a concurrent
    /// `set` already replaced it (last write wins).
    async fn finish(&self, key: &str, tag: u64, value: Option<String>) {
        let mut slots = self.slots.lock().await;
        if matches!(slots.get(key), Some(Slot::Pending(t, _)) if *t == tag) {
            match value {
                Some(value) => {
                    slots.insert(key.to_string(), Slot::Resolved(value));
                }
                None => {
                    slots.remove(key);
                }
            }
        }
    }

    async fn resolved_value(&self, key: &str) -> Option<String> {
        let slots = self.slots.lock().await;
        match slots.get(key) {
            Some(Slot::Resolved(value)) => Some(value.clone()),
            _ => None,
        }
    }
}
