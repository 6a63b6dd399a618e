//! In-memory blob cache with byte budgeting and LRU eviction

use crate::types::{CacheStats, CachedBlob};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tracing::debug;

struct Entry {
    blob: CachedBlob,
    last_access: u64,
}

struct CacheInner {
    budget_bytes: u64,
    total_bytes: u64,
    /// Monotonic access counter. Ticks are unique, so recency order is total
    /// and earlier inserts always evict before later ones.
    tick: u64,
    entries: HashMap<String, Entry>,
    /// Recency index: tick -> key, oldest first
    recency: BTreeMap<u64, String>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl CacheInner {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn touch(&mut self, key: &str) {
        let tick = self.next_tick();
        if let Some(entry) = self.entries.get_mut(key) {
            self.recency.remove(&entry.last_access);
            entry.last_access = tick;
            self.recency.insert(tick, key.to_string());
        }
    }

    fn evict_to_budget(&mut self) {
        while self.total_bytes > self.budget_bytes {
            let Some((_, key)) = self.recency.pop_first() else {
                break;
            };
            if let Some(entry) = self.entries.remove(&key) {
                self.total_bytes -= entry.blob.size_bytes();
                self.evictions += 1;
                debug!(
                    key = %key,
                    size = entry.blob.size_bytes(),
                    total = self.total_bytes,
                    "Evicted blob from cache"
                );
            }
        }
    }
}

/// Byte-budgeted in-memory blob cache
///
/// Entries are ordered by recency of access; whenever the running total
/// exceeds the budget, the least recently used entries are evicted until the
/// total fits again. The handle is cloneable and shares one underlying cache,
/// so the accumulator, the preload coordinator, and the renderer can all hold
/// the same explicitly constructed instance.
///
/// All operations are synchronous and perform no I/O; populating the cache is
/// the caller's responsibility.
#[derive(Clone)]
pub struct MediaCache {
    inner: Arc<Mutex<CacheInner>>,
}

impl MediaCache {
    /// Create a cache with a fixed byte budget
    ///
    /// # Panics
    /// Panics if `budget_bytes` is zero; a cache with no budget is a
    /// configuration bug, not a runtime condition.
    pub fn new(budget_bytes: u64) -> Self {
        assert!(budget_bytes > 0, "cache budget must be positive");
        Self {
            inner: Arc::new(Mutex::new(CacheInner {
                budget_bytes,
                total_bytes: 0,
                tick: 0,
                entries: HashMap::new(),
                recency: BTreeMap::new(),
                hits: 0,
                misses: 0,
                evictions: 0,
            })),
        }
    }

    /// Look up a blob by key, refreshing its recency on a hit
    ///
    /// A miss has no side effect beyond the miss counter.
    pub fn get(&self, key: &str) -> Option<CachedBlob> {
        let mut inner = self.inner.lock().unwrap();
        if inner.entries.contains_key(key) {
            inner.touch(key);
            inner.hits += 1;
            inner.entries.get(key).map(|e| e.blob.clone())
        } else {
            inner.misses += 1;
            None
        }
    }

    /// Check whether a key is cached without refreshing its recency
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().unwrap().entries.contains_key(key)
    }

    /// Insert or replace the blob for a key, then evict back down to budget
    ///
    /// Replacement is atomic from the caller's point of view: the old entry's
    /// size is subtracted before the new one is added, so a key is never
    /// accounted twice. The new entry's recency is "now".
    pub fn put(&self, key: &str, blob: CachedBlob) {
        let size = blob.size_bytes();
        let mut inner = self.inner.lock().unwrap();

        if let Some(old) = inner.entries.remove(key) {
            inner.recency.remove(&old.last_access);
            inner.total_bytes -= old.blob.size_bytes();
        }

        let tick = inner.next_tick();
        inner.entries.insert(
            key.to_string(),
            Entry {
                blob,
                last_access: tick,
            },
        );
        inner.recency.insert(tick, key.to_string());
        inner.total_bytes += size;

        debug!(key = %key, size, total = inner.total_bytes, "Cached blob");
        inner.evict_to_budget();
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of cached blob sizes in bytes
    pub fn total_bytes(&self) -> u64 {
        self.inner.lock().unwrap().total_bytes
    }

    /// The fixed byte budget this cache was constructed with
    pub fn budget_bytes(&self) -> u64 {
        self.inner.lock().unwrap().budget_bytes
    }

    /// Snapshot of cache statistics
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().unwrap();
        CacheStats {
            entries: inner.entries.len(),
            total_bytes: inner.total_bytes,
            budget_bytes: inner.budget_bytes,
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
        }
    }
}

impl std::fmt::Debug for MediaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("MediaCache")
            .field("entries", &stats.entries)
            .field("total_bytes", &stats.total_bytes)
            .field("budget_bytes", &stats.budget_bytes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(size: usize) -> CachedBlob {
        CachedBlob::new(vec![0u8; size], "image/jpeg")
    }

    #[test]
    #[should_panic(expected = "cache budget must be positive")]
    fn test_zero_budget_panics() {
        MediaCache::new(0);
    }

    #[test]
    fn test_get_miss_returns_none() {
        let cache = MediaCache::new(100);
        assert!(cache.get("missing").is_none());
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_put_and_get() {
        let cache = MediaCache::new(100);
        cache.put("a", blob(10));

        let got = cache.get("a").unwrap();
        assert_eq!(got.size_bytes(), 10);
        assert_eq!(got.content_type(), "image/jpeg");
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_budget_invariant_holds_after_every_put() {
        let cache = MediaCache::new(25);
        for i in 0..20 {
            cache.put(&format!("key-{i}"), blob(7));
            assert!(cache.total_bytes() <= 25);
        }
    }

    #[test]
    fn test_evicts_oldest_first() {
        let cache = MediaCache::new(10);
        cache.put("a", blob(4));
        cache.put("b", blob(4));
        cache.put("c", blob(4));

        // 12 > 10, so the oldest entry (a) is gone
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
        assert_eq!(cache.total_bytes(), 8);
    }

    #[test]
    fn test_get_refreshes_recency() {
        let cache = MediaCache::new(10);
        cache.put("a", blob(4));
        cache.put("b", blob(4));
        cache.put("c", blob(4));
        // a evicted; {b, c} remain

        // Touch b so c becomes the oldest
        assert!(cache.get("b").is_some());

        cache.put("d", blob(4));
        assert!(cache.contains("b"));
        assert!(!cache.contains("c"));
        assert!(cache.contains("d"));
        assert_eq!(cache.total_bytes(), 8);
    }

    #[test]
    fn test_contains_does_not_refresh_recency() {
        let cache = MediaCache::new(8);
        cache.put("a", blob(4));
        cache.put("b", blob(4));

        // A probe must not rescue `a` from eviction
        assert!(cache.contains("a"));

        cache.put("c", blob(4));
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn test_replace_does_not_double_count() {
        let cache = MediaCache::new(100);
        cache.put("k", blob(10));
        assert_eq!(cache.total_bytes(), 10);

        cache.put("k", blob(6));
        assert_eq!(cache.total_bytes(), 6);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_replace_refreshes_recency() {
        let cache = MediaCache::new(10);
        cache.put("a", blob(4));
        cache.put("b", blob(4));

        // Re-putting a makes b the oldest
        cache.put("a", blob(4));
        cache.put("c", blob(4));

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn test_entry_larger_than_budget_is_evicted() {
        let cache = MediaCache::new(10);
        cache.put("huge", blob(50));
        assert!(!cache.contains("huge"));
        assert_eq!(cache.total_bytes(), 0);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_eviction_counter() {
        let cache = MediaCache::new(8);
        cache.put("a", blob(4));
        cache.put("b", blob(4));
        cache.put("c", blob(4));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_clone_shares_state() {
        let cache = MediaCache::new(100);
        let handle = cache.clone();
        handle.put("a", blob(10));
        assert!(cache.contains("a"));
        assert_eq!(cache.total_bytes(), 10);
    }
}
