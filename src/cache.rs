use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::data_models::{ResultSet, SearchRequest};
use crate::error::{Error, Result};

struct CachedResult {
    stored_at: Instant,
    value: Arc<ResultSet>,
}

type Slot = Arc<OnceCell<CachedResult>>;

/// Memoizes pipeline output per canonical request key.
///
/// Each key owns its own slot, so at most one computation runs per key while
/// different keys proceed in parallel. Callers arriving during a computation
/// wait on the slot and share its result. If the computation fails the slot
/// stays empty and the next waiter runs the computation itself.
pub struct QueryCache {
    slots: DashMap<String, Slot>,
    ttl: Option<Duration>,
}

impl QueryCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            slots: DashMap::new(),
            ttl,
        }
    }

    pub async fn get_or_compute<F, Fut>(
        &self,
        request: &SearchRequest,
        compute: F,
    ) -> Result<Arc<ResultSet>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ResultSet>>,
    {
        let key = request.cache_key();
        let slot = self.slot(&key);
        if let Some(cached) = slot.get() {
            tracing::debug!(key = %key, "query cache hit");
            return Ok(cached.value.clone());
        }

        let log_key = key.clone();
        let result = slot
            .get_or_try_init(move || async move {
                let value = compute().await.inspect_err(|e| {
                    tracing::warn!(key = %log_key, error = %e, "query computation failed");
                })?;
                Ok::<_, Error>(CachedResult {
                    stored_at: Instant::now(),
                    value: Arc::new(value),
                })
            })
            .await;

        match result {
            Ok(cached) => Ok(cached.value.clone()),
            Err(e) => {
                self.discard_empty(&key, &slot);
                Err(e)
            }
        }
    }

    /// Removes `slot` if it is still the entry for `key`, never filled, and
    /// held by nobody but the map and the caller. Waiters keep it alive.
    fn discard_empty(&self, key: &str, slot: &Slot) {
        self.slots.remove_if(key, |_, current| {
            Arc::ptr_eq(current, slot)
                && !current.initialized()
                && Arc::strong_count(current) == 2
        });
    }

    /// Slot for `key`, replacing it first if its value has outlived the TTL.
    fn slot(&self, key: &str) -> Slot {
        if let Some(ttl) = self.ttl {
            let expired = self.slots.remove_if(key, |_, slot| {
                slot.get().is_some_and(|cached| cached.stored_at.elapsed() >= ttl)
            });
            if expired.is_some() {
                tracing::debug!(key, "query cache entry expired");
            }
        }
        self.slots.entry(key.to_string()).or_default().clone()
    }

    /// Drops the entry for one request. Returns whether a finished entry was removed.
    ///
    /// A computation already in flight for the request keeps running and its
    /// waiters still receive its result, but the result is not stored. A caller
    /// arriving afterwards starts a fresh computation, so two may overlap.
    pub fn invalidate(&self, request: &SearchRequest) -> bool {
        self.slots
            .remove(&request.cache_key())
            .is_some_and(|(_, slot)| slot.initialized())
    }

    /// Drops every entry. In-flight computations are detached the same way as
    /// with [`QueryCache::invalidate`].
    pub fn clear(&self) {
        self.slots.clear();
    }

    /// Number of completed entries.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request(query: &str) -> SearchRequest {
        SearchRequest::with_query(query).unwrap()
    }

    #[tokio::test]
    async fn test_failed_computation_leaves_no_slot() {
        let cache = QueryCache::default();
        let req = request("rust");

        let err = cache
            .get_or_compute(&req, || async {
                Err(Error::upstream("search", "connection reset by peer"))
            })
            .await
            .unwrap_err();
        assert!(err.is_upstream());
        assert!(cache.slots.is_empty());

        let value = cache
            .get_or_compute(&req, || async { Ok(ResultSet::empty("rust")) })
            .await
            .unwrap();
        assert_eq!(value.query, "rust");
        assert_eq!(cache.slots.len(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_slot_for_waiters() {
        let cache = QueryCache::default();
        let req = request("rust");
        let calls = AtomicUsize::new(0);

        let compute = || async {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if call == 0 {
                Err(Error::upstream("search", "timed out"))
            } else {
                Ok::<_, Error>(ResultSet::empty("rust"))
            }
        };
        let (first, second) = tokio::join!(
            cache.get_or_compute(&req, compute),
            cache.get_or_compute(&req, compute)
        );

        assert!(first.is_err());
        assert!(second.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.slots.len(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_detaches_in_flight_computation() {
        let cache = QueryCache::default();
        let req = request("rust");

        let running = cache.get_or_compute(&req, || async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(ResultSet::empty("first"))
        });
        let clear_then_run = async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            cache.clear();
            cache
                .get_or_compute(&req, || async { Ok(ResultSet::empty("second")) })
                .await
        };
        let (first, second) = tokio::join!(running, clear_then_run);

        assert_eq!(first.unwrap().query, "first");
        assert_eq!(second.unwrap().query, "second");
        assert_eq!(cache.len(), 1);
    }
}
