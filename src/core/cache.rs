//! Bounded key/value cache.
//!
//! Entries live in an [`IndexMap`] whose order is the eviction order: the
//! front is evicted first. With [`EvictionPolicy::InsertionOrder`] a lookup
//! never reorders; with [`EvictionPolicy::Recency`] a hit moves the entry to
//! the back.

use std::hash::Hash;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Which entry a full cache gives up first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Earliest inserted entry; hits do not refresh.
    #[default]
    InsertionOrder,
    /// Least recently inserted or hit entry.
    Recency,
}

/// Cache statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub evictions: usize,
}

impl CacheStats {
    /// Hit ratio in 0..=1, zero before the first lookup.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Capacity-bounded map with explicit eviction order.
#[derive(Debug, Clone)]
pub struct BoundedCache<K, V> {
    entries: IndexMap<K, V>,
    capacity: usize,
    policy: EvictionPolicy,
    stats: CacheStats,
}

impl<K: Hash + Eq + Clone, V> BoundedCache<K, V> {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize, policy: EvictionPolicy) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: IndexMap::with_capacity(capacity),
            capacity,
            policy,
            stats: CacheStats::default(),
        }
    }

    /// Look up an entry, counting a hit or miss.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let Some(index) = self.entries.get_index_of(key) else {
            self.stats.misses += 1;
            return None;
        };
        self.stats.hits += 1;
        let index = match self.policy {
            EvictionPolicy::InsertionOrder => index,
            EvictionPolicy::Recency => {
                let last = self.entries.len() - 1;
                self.entries.move_index(index, last);
                last
            }
        };
        self.entries.get_index(index).map(|(_, v)| v)
    }

    /// Look up an entry without touching order or statistics.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert an entry, evicting from the front while full.
    ///
    /// Returns the evicted pairs so the caller can release what they own.
    pub fn insert(&mut self, key: K, value: V) -> Vec<(K, V)> {
        self.insert_with_pinned(key, value, |_| false)
    }

    /// Insert an entry; eviction skips keys for which `pinned` is true.
    ///
    /// If every resident key is pinned the cache grows past capacity
    /// rather than dropping a pinned entry.
    pub fn insert_with_pinned(
        &mut self,
        key: K,
        value: V,
        pinned: impl Fn(&K) -> bool,
    ) -> Vec<(K, V)> {
        let mut evicted = Vec::new();

        if self.entries.contains_key(&key) {
            // Replacing keeps the slot count unchanged.
            self.entries.shift_remove(&key);
        } else {
            while self.entries.len() >= self.capacity {
                let victim = self
                    .entries
                    .keys()
                    .position(|k| k != &key && !pinned(k));
                match victim.and_then(|i| self.entries.shift_remove_index(i)) {
                    Some(pair) => {
                        self.stats.evictions += 1;
                        evicted.push(pair);
                    }
                    None => {
                        tracing::error!(
                            capacity = self.capacity,
                            "cache full of pinned entries, growing past capacity"
                        );
                        debug_assert!(false, "bounded cache has no evictable entry");
                        break;
                    }
                }
            }
        }

        self.entries.insert(key, value);
        evicted
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.shift_remove(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Keys in eviction order (front is evicted first).
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Drain every entry, front first.
    pub fn clear(&mut self) -> Vec<(K, V)> {
        self.entries.drain(..).collect()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_eviction() {
        let mut cache = BoundedCache::new(2, EvictionPolicy::InsertionOrder);
        assert!(cache.insert(1, "a").is_empty());
        assert!(cache.insert(2, "b").is_empty());

        // A hit does not save the oldest entry.
        assert_eq!(cache.get(&1), Some(&"a"));
        let evicted = cache.insert(3, "c");
        assert_eq!(evicted, vec![(1, "a")]);
        assert_eq!(cache.keys().copied().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_recency_eviction() {
        let mut cache = BoundedCache::new(2, EvictionPolicy::Recency);
        cache.insert(1, "a");
        cache.insert(2, "b");
        cache.get(&1);
        let evicted = cache.insert(3, "c");
        assert_eq!(evicted, vec![(2, "b")]);
    }

    #[test]
    fn test_pinned_entries_survive() {
        let mut cache = BoundedCache::new(3, EvictionPolicy::InsertionOrder);
        for k in 0..3 {
            cache.insert(k, k * 10);
        }
        let evicted = cache.insert_with_pinned(3, 30, |k| *k < 2);
        assert_eq!(evicted, vec![(2, 20)]);
        assert!(cache.contains(&0) && cache.contains(&1) && cache.contains(&3));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_replace_does_not_evict() {
        let mut cache = BoundedCache::new(2, EvictionPolicy::InsertionOrder);
        cache.insert("x", 1);
        cache.insert("y", 2);
        assert!(cache.insert("x", 3).is_empty());
        assert_eq!(cache.peek(&"x"), Some(&3));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_stats() {
        let mut cache = BoundedCache::new(1, EvictionPolicy::InsertionOrder);
        cache.insert(1, ());
        cache.get(&1);
        cache.get(&2);
        cache.insert(2, ());
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
        assert!((stats.hit_ratio() - 0.5).abs() < 1e-9);
    }
}
