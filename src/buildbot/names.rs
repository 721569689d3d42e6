use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, MutexGuard, PoisonError, Weak};

use futures::future::{BoxFuture, FutureExt, Shared};
use indexmap::IndexMap;
use log::{debug, warn};
use tokio::sync::Mutex;

use super::client::{fetch_builders, Transport};
use super::types::Builder;
use crate::error::{BuildviewError, Result};

/// Name reported for a builder id the backend does not know.
pub const UNKNOWN_BUILDER: &str = "unknown";

type FetchOutcome = std::result::Result<(), Arc<BuildviewError>>;
type PendingFetch = Shared<BoxFuture<'static, FetchOutcome>>;
type PendingMap = HashMap<Vec<u64>, (u64, PendingFetch)>;

/// Builder id to name cache.
///
/// Entries are only ever added; a builder keeps its name for the lifetime of
/// the cache. Lookups fetch the missing ids in one batched request, and
/// concurrent lookups missing the same id set share that request.
#[derive(Clone, Default)]
pub struct BuilderNames {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    names: Mutex<HashMap<u64, String>>,
    /// In-flight fetches keyed by their sorted id set, tagged with a generation
    /// so a finished fetch only removes its own entry. Never held across an await.
    pending: std::sync::Mutex<PendingMap>,
    generation: AtomicU64,
}

impl fmt::Debug for BuilderNames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuilderNames").finish_non_exhaustive()
    }
}

impl BuilderNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn cached_name(&self, id: u64) -> Option<String> {
        self.inner.names.lock().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.names.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Stores the names of freshly fetched builders.
    pub async fn record(&self, builders: &[Builder]) {
        if builders.is_empty() {
            return;
        }

        let mut names = self.inner.names.lock().await;
        for builder in builders {
            names.insert(builder.builderid, builder.name.clone());
        }
        debug!("Cached {} builder names ({} total)", builders.len(), names.len());
    }

    /// Maps every id in `ids` to a builder name.
    ///
    /// Ids not yet cached are fetched with a single request. Ids the backend
    /// does not return map to [`UNKNOWN_BUILDER`]. The result follows the order
    /// of `ids`, with duplicates collapsed.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the fetch of missing ids fails. Nothing
    /// is cached in that case.
    pub async fn resolve_names(
        &self,
        transport: &Transport,
        ids: &[u64],
    ) -> Result<IndexMap<u64, String>> {
        let missing = self.missing(ids).await;
        if missing.is_empty() {
            debug!("Builder names cache hit for {} ids", ids.len());
        } else {
            debug!("Builder names cache miss for {missing:?}");
            self.fetch_missing(transport, missing).await?;
        }

        let names = self.inner.names.lock().await;
        let mut resolved = IndexMap::with_capacity(ids.len());
        for &id in ids {
            if resolved.contains_key(&id) {
                continue;
            }
            let name = names.get(&id).cloned().unwrap_or_else(|| {
                warn!("Builder {id} not found, using '{UNKNOWN_BUILDER}'");
                UNKNOWN_BUILDER.to_string()
            });
            resolved.insert(id, name);
        }

        Ok(resolved)
    }

    pub async fn resolve_name(&self, transport: &Transport, id: u64) -> Result<String> {
        let mut resolved = self.resolve_names(transport, &[id]).await?;
        Ok(resolved
            .swap_remove(&id)
            .unwrap_or_else(|| UNKNOWN_BUILDER.to_string()))
    }

    /// Sorted, de-duplicated ids that have no cached name.
    async fn missing(&self, ids: &[u64]) -> Vec<u64> {
        let names = self.inner.names.lock().await;
        let mut missing: Vec<u64> = ids
            .iter()
            .copied()
            .filter(|id| !names.contains_key(id))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }

    async fn fetch_missing(&self, transport: &Transport, missing: Vec<u64>) -> Result<()> {
        let fetch = {
            let mut pending = lock_pending(&self.inner);
            match pending.get(&missing) {
                Some((_, fetch)) => {
                    debug!("Joining in-flight builder fetch for {missing:?}");
                    fetch.clone()
                }
                None => {
                    let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed);
                    let fetch = start_fetch(
                        Arc::downgrade(&self.inner),
                        transport.clone(),
                        missing.clone(),
                        generation,
                    );
                    pending.insert(missing, (generation, fetch.clone()));
                    fetch
                }
            }
        };

        fetch.await.map_err(BuildviewError::from_shared)
    }
}

fn lock_pending(inner: &Inner) -> MutexGuard<'_, PendingMap> {
    inner.pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Starts a batched fetch of `ids`.
///
/// The fetch records the names and retires its own pending entry before it
/// completes. Cleanup therefore runs once, whichever caller drives it to the
/// end, even if the caller that started it was dropped.
fn start_fetch(
    inner: Weak<Inner>,
    transport: Transport,
    ids: Vec<u64>,
    generation: u64,
) -> PendingFetch {
    async move {
        let outcome = fetch_builders(&transport, &ids).await;

        let Some(inner) = inner.upgrade() else {
            return outcome.map(drop).map_err(Arc::new);
        };
        if let Ok(builders) = &outcome {
            BuilderNames { inner: inner.clone() }.record(builders).await;
        }

        let mut pending = lock_pending(&inner);
        if pending
            .get(&ids)
            .is_some_and(|(current, _)| *current == generation)
        {
            pending.remove(&ids);
        }

        outcome.map(drop).map_err(Arc::new)
    }
    .boxed()
    .shared()
}
