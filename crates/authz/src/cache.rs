//! Process-local, time-boxed grant cache.
//!
//! A plain RwLock-guarded map of `(value, expires_at)` entries. There is no
//! active invalidation hook: identity changes (group membership, menu links)
//! surface only after the TTL elapses. That staleness window is part of the
//! external contract, not an accident.
//!
//! Concurrent duplicate computation is permitted: two requests missing on the
//! same key may both run the compute function and both store the result
//! (last writer wins). A torn or partially-written value is never observable.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};

use admingate_core::Clock;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// Keyed TTL cache, safe for concurrent readers and writers.
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Return the cached value if its entry has not expired.
    ///
    /// A read past `expires_at` behaves exactly like a miss; the stale entry
    /// is left in place for the next writer to replace.
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(key)?;
        if self.clock.now() < entry.expires_at {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Store a value with expiry `now + ttl`, replacing any prior entry.
    pub fn insert(&self, key: K, value: V, ttl: Duration) {
        let expires_at = self.clock.now() + ttl;
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, CacheEntry { value, expires_at });
        }
    }

    /// Serve a fresh entry, or run `compute` and store its result.
    ///
    /// Errors from `compute` propagate and are never cached. The lock is not
    /// held across the computation, so a concurrent miss on the same key may
    /// compute redundantly; both callers converge on the same value within
    /// one TTL window.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: K,
        ttl: Duration,
        compute: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let value = compute().await?;
        self.insert(key, value.clone(), ttl);
        Ok(value)
    }

    /// Drop one entry (operational use only; nothing in the engine calls
    /// this on identity changes).
    pub fn remove(&self, key: &K) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
    }

    /// Drop everything.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    /// Number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admingate_core::ManualClock;
    use std::convert::Infallible;

    fn cache_with_clock() -> (TtlCache<&'static str, u32>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        (TtlCache::new(clock.clone()), clock)
    }

    #[tokio::test]
    async fn hit_within_ttl_skips_compute() {
        let (cache, _clock) = cache_with_clock();
        let ttl = Duration::minutes(15);

        let first: Result<u32, Infallible> =
            cache.get_or_compute("k", ttl, || async { Ok(1) }).await;
        assert_eq!(first.unwrap(), 1);

        // Underlying data "changed"; the cached value must win within TTL.
        let second: Result<u32, Infallible> =
            cache.get_or_compute("k", ttl, || async { Ok(2) }).await;
        assert_eq!(second.unwrap(), 1);
    }

    #[tokio::test]
    async fn expiry_triggers_recompute() {
        let (cache, clock) = cache_with_clock();
        let ttl = Duration::minutes(15);

        let _: Result<u32, Infallible> = cache.get_or_compute("k", ttl, || async { Ok(1) }).await;

        clock.advance(Duration::minutes(15));
        assert_eq!(cache.get(&"k"), None);

        let recomputed: Result<u32, Infallible> =
            cache.get_or_compute("k", ttl, || async { Ok(2) }).await;
        assert_eq!(recomputed.unwrap(), 2);
    }

    #[tokio::test]
    async fn read_just_before_expiry_is_a_hit() {
        let (cache, clock) = cache_with_clock();
        let ttl = Duration::minutes(15);

        cache.insert("k", 7, ttl);
        clock.advance(Duration::minutes(15) - Duration::seconds(1));
        assert_eq!(cache.get(&"k"), Some(7));
    }

    #[tokio::test]
    async fn compute_errors_are_not_cached() {
        let (cache, _clock) = cache_with_clock();
        let ttl = Duration::minutes(15);

        let failed: Result<u32, &str> = cache
            .get_or_compute("k", ttl, || async { Err("store down") })
            .await;
        assert!(failed.is_err());
        assert!(cache.is_empty());

        let ok: Result<u32, &str> = cache.get_or_compute("k", ttl, || async { Ok(3) }).await;
        assert_eq!(ok.unwrap(), 3);
    }

    #[tokio::test]
    async fn remove_and_clear_drop_entries() {
        let (cache, _clock) = cache_with_clock();
        cache.insert("a", 1, Duration::minutes(1));
        cache.insert("b", 2, Duration::minutes(1));

        cache.remove(&"a");
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(2));

        cache.clear();
        assert!(cache.is_empty());
    }
}
