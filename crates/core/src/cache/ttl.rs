//! Bounded in-memory cache with per-entry expiry.
//!
//! Entries expire `ttl` after they were stored. Expiry is checked lazily on
//! every read and proactively by [`TtlCache::sweep`], which can also run on a
//! background task via [`TtlCache::spawn_sweeper`]. When a new key is inserted
//! into a full cache, the oldest-inserted entry is evicted (insertion order, not
//! LRU).

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Shortest sweep period; shorter intervals are raised to it.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(100);

/// A stored value with the instant it was stored.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
    seq: u64,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() > ttl
    }
}

#[derive(Debug)]
struct Store<V> {
    entries: HashMap<String, CacheEntry<V>>,
    /// Insertion sequence -> key, oldest first.
    order: BTreeMap<u64, String>,
    next_seq: u64,
}

impl<V> Store<V> {
    fn remove(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.order.remove(&entry.seq);
        Some(entry)
    }

    fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.entries.remove(&key);
        Some(key)
    }
}

/// Shared handle to a bounded TTL cache.
///
/// Cloning is cheap; all clones see the same entries.
#[derive(Debug)]
pub struct TtlCache<V> {
    store: Arc<Mutex<Store<V>>>,
    ttl: Duration,
    max_entries: usize,
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), ttl: self.ttl, max_entries: self.max_entries }
    }
}

impl<V: Clone + Send + 'static> TtlCache<V> {
    /// Create an empty cache. A `max_entries` of 0 is treated as 1.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            store: Arc::new(Mutex::new(Store { entries: HashMap::new(), order: BTreeMap::new(), next_seq: 0 })),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Return the value for `key` if it is not older than the TTL.
    ///
    /// An expired entry is removed and reported as absent.
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut store = self.store.lock().await;
        let expired = store.entries.get(key)?.is_expired(self.ttl);
        if expired {
            store.remove(key);
            tracing::trace!(key, "cache entry expired");
            return None;
        }
        store.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Store `value` under `key` with the current timestamp.
    ///
    /// Inserting a new key into a full cache evicts the oldest-inserted entry
    /// first. Overwriting an existing key never evicts; the key becomes the
    /// newest entry.
    pub async fn set(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let mut store = self.store.lock().await;

        if store.remove(&key).is_none()
            && store.entries.len() >= self.max_entries
            && let Some(evicted) = store.evict_oldest()
        {
            tracing::debug!(evicted = %evicted, "cache at capacity, evicted oldest entry");
        }

        let seq = store.next_seq;
        store.next_seq += 1;
        store.order.insert(seq, key.clone());
        store.entries.insert(key, CacheEntry { value, stored_at: Instant::now(), seq });
    }

    /// Remove `key`, returning its value if it was present and fresh.
    pub async fn remove(&self, key: &str) -> Option<V> {
        let mut store = self.store.lock().await;
        let entry = store.remove(key)?;
        (!entry.is_expired(self.ttl)).then_some(entry.value)
    }

    /// Remove every expired entry. Returns the number removed.
    pub async fn sweep(&self) -> usize {
        let mut store = self.store.lock().await;
        let expired: Vec<String> = store
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(self.ttl))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            store.remove(key);
        }
        expired.len()
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.store.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        let mut store = self.store.lock().await;
        store.entries.clear();
        store.order.clear();
    }

    /// Run [`sweep`](Self::sweep) every `interval` on the current tokio runtime.
    ///
    /// The task runs until the returned handle is aborted. Intervals below
    /// [`MIN_SWEEP_INTERVAL`] (including zero) are clamped to it.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        let interval = interval.max(MIN_SWEEP_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = cache.sweep().await;
                if removed > 0 {
                    tracing::debug!(removed, "swept expired cache entries");
                }
            }
        })
    }
}
