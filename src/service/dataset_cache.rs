//! Load-once cache for a parsed dataset

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info};
use utoipa::ToSchema;

use crate::error::Result;
use crate::model::Dataset;

/// Load progress of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    NotLoaded,
    Loading,
    Loaded,
    Failed,
}

/// Snapshot of a dataset cache for status reporting
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DatasetStatus {
    pub name: String,
    pub state: LoadState,
    /// Usable rows
    pub entries: usize,
    /// Rows dropped while parsing
    pub skipped: usize,
    /// RFC 3339 time the dataset finished loading
    pub loaded_at: Option<String>,
    pub error: Option<String>,
}

struct Slot<D> {
    state: LoadState,
    data: Option<Arc<D>>,
    loaded_at: Option<DateTime<Utc>>,
    error: Option<String>,
}

/// Holds one dataset, loaded at most once.
///
/// The first call to [`DatasetCache::load_with`] runs the loader; any call made
/// while that load is in flight, or after it finished, returns immediately.
/// A failed load is not retried and leaves the cache empty.
pub struct DatasetCache<D> {
    name: &'static str,
    started: AtomicBool,
    slot: RwLock<Slot<D>>,
}

impl<D: Dataset> DatasetCache<D> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            started: AtomicBool::new(false),
            slot: RwLock::new(Slot {
                state: LoadState::NotLoaded,
                data: None,
                loaded_at: None,
                error: None,
            }),
        }
    }

    /// Cache pre-filled with an already parsed dataset
    pub fn with_data(name: &'static str, data: D) -> Self {
        let cache = Self::new(name);
        cache.started.store(true, Ordering::Release);
        cache.store(Ok(data));
        cache
    }

    /// Run `load` unless a load has already been started.
    ///
    /// Returns `true` if this call performed the load.
    pub async fn load_with<F, Fut>(&self, load: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<D>>,
    {
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("{} already loading or loaded, skipping fetch", self.name);
            return false;
        }

        self.write_slot(|slot| slot.state = LoadState::Loading);
        self.store(load().await);
        true
    }

    fn store(&self, result: Result<D>) {
        match result {
            Ok(data) => {
                info!(
                    "Loaded {}: {} entries ({} skipped)",
                    self.name,
                    data.len(),
                    data.skipped()
                );
                self.write_slot(|slot| {
                    slot.state = LoadState::Loaded;
                    slot.data = Some(Arc::new(data));
                    slot.loaded_at = Some(Utc::now());
                    slot.error = None;
                });
            }
            Err(e) => {
                error!("Failed to load {}: {}", self.name, e);
                self.write_slot(|slot| {
                    slot.state = LoadState::Failed;
                    slot.data = None;
                    slot.error = Some(e.to_string());
                });
            }
        }
    }

    fn write_slot(&self, f: impl FnOnce(&mut Slot<D>)) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut slot);
    }

    /// Loaded dataset, or `None` until a load succeeds
    pub fn get(&self) -> Option<Arc<D>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .data
            .clone()
    }

    pub fn status(&self) -> DatasetStatus {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        DatasetStatus {
            name: self.name.to_string(),
            state: slot.state,
            entries: slot.data.as_ref().map_or(0, |d| d.len()),
            skipped: slot.data.as_ref().map_or(0, |d| d.skipped()),
            loaded_at: slot.loaded_at.map(|t| t.to_rfc3339()),
            error: slot.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckError;
    use crate::model::PrefixList;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn test_loads_once() {
        let cache: DatasetCache<PrefixList> = DatasetCache::new("prefixes");
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        assert!(cache.get().is_none());
        assert_eq!(cache.status().state, LoadState::NotLoaded);

        let first = cache
            .load_with(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(PrefixList::default())
            })
            .await;
        let second = cache
            .load_with(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(PrefixList::default())
            })
            .await;

        assert!(first);
        assert!(!second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.get().is_some());

        let status = cache.status();
        assert_eq!(status.state, LoadState::Loaded);
        assert!(status.loaded_at.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_loads_fetch_once() {
        let cache: DatasetCache<PrefixList> = DatasetCache::new("prefixes");
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let load = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok(PrefixList::default())
        };
        let (a, b) = futures::join!(cache.load_with(load), cache.load_with(load));

        assert!(a ^ b);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_leaves_cache_empty() {
        let cache: DatasetCache<PrefixList> = DatasetCache::new("prefixes");
        cache
            .load_with(|| async { Err(CheckError::Network("connection refused".to_string())) })
            .await;

        assert!(cache.get().is_none());
        let status = cache.status();
        assert_eq!(status.state, LoadState::Failed);
        assert!(status.error.unwrap().contains("connection refused"));

        // No retry after a failure
        let retried = cache.load_with(|| async { Ok(PrefixList::default()) }).await;
        assert!(!retried);
        assert!(cache.get().is_none());
    }
}
