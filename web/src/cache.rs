//! In-process memoization with single-flight semantics.
//!
//! [`MemoryCache::get_or_create`] guarantees at most one in-flight
//! computation per key: the first caller runs the factory, everyone arriving
//! while it runs awaits the same result, and the completed value is reused
//! until the entry expires. Expiry is measured from entry creation.
//!
//! If the computing caller is cancelled (client disconnect drops the handler
//! future) the entry stays uninitialized and the next waiter runs the factory.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::Instant;

struct Entry<V> {
    value: Arc<OnceCell<V>>,
    expires_at: Instant,
}

/// Keyed cache of lazily computed values with a fixed time-to-live.
pub struct MemoryCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
    ttl: Duration,
}

impl<K, V> std::fmt::Debug for MemoryCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl<K, V> MemoryCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// An empty cache whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Entry lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value for `key`, computing it with `factory` if the
    /// entry is missing or expired.
    pub async fn get_or_create<F, Fut>(&self, key: K, factory: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let cell = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            let now = Instant::now();

            match entries.get(&key) {
                Some(entry) if entry.expires_at > now => Arc::clone(&entry.value),
                _ => {
                    let value = Arc::new(OnceCell::new());
                    entries.retain(|_, entry| entry.expires_at > now);
                    entries.insert(
                        key,
                        Entry {
                            value: Arc::clone(&value),
                            expires_at: now + self.ttl,
                        },
                    );
                    value
                }
            }
        };

        cell.get_or_init(factory).await.clone()
    }

    /// Drop the entry for `key`.
    pub fn remove(&self, key: &K) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    /// Whether there are no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(60);

    async fn counted(calls: &AtomicUsize, value: u32) -> u32 {
        calls.fetch_add(1, Ordering::SeqCst);
        value
    }

    #[tokio::test(start_paused = true)]
    async fn test_value_reused_within_ttl() {
        let cache = MemoryCache::new(TTL);
        let calls = AtomicUsize::new(0);

        assert_eq!(cache.get_or_create("k", || counted(&calls, 1)).await, 1);
        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get_or_create("k", || counted(&calls, 2)).await, 1);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_value_recomputed_after_ttl() {
        let cache = MemoryCache::new(TTL);
        let calls = AtomicUsize::new(0);

        assert_eq!(cache.get_or_create("k", || counted(&calls, 1)).await, 1);
        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get_or_create("k", || counted(&calls, 2)).await, 2);
        assert_eq!(cache.get_or_create("k", || counted(&calls, 3)).await, 2);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_computation() {
        let cache = Arc::new(MemoryCache::new(TTL));
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..10)
            .map(|i| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    cache
                        .get_or_create("k", || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_secs(5)).await;
                            i
                        })
                        .await
                })
            })
            .collect();

        let mut results = Vec::new();
        for task in tasks {
            results.push(task.await.unwrap());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_computation_is_retried() {
        let cache = Arc::new(MemoryCache::new(TTL));

        let first = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                cache
                    .get_or_create("k", || async {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        1
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        first.abort();
        assert!(first.await.unwrap_err().is_cancelled());

        assert_eq!(cache.get_or_create("k", || async { 2 }).await, 2);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache = MemoryCache::new(TTL);

        assert_eq!(cache.get_or_create(1, || async { "one" }).await, "one");
        assert_eq!(cache.get_or_create(2, || async { "two" }).await, "two");
        assert_eq!(cache.len(), 2);

        cache.remove(&1);
        assert_eq!(cache.len(), 1);
        assert!(!cache.is_empty());
    }
}
