use core::{hash::Hash, num::NonZeroUsize};

use lru::LruCache;
use parking_lot::Mutex;

use crate::cache_index::{CacheIndex, EvictionPolicy};

/// A bounded map with least-recently-used eviction.
///
/// Reads promote entries, so every access needs exclusive access to the [`LruCache`].
pub struct SlotIndexedCache<K, V> {
    entries: Mutex<LruCache<K, V>>,
}

impl<K: Hash + Eq, V: Clone> SlotIndexedCache<K, V> {
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }
}

impl<K: Hash + Eq, V: Clone> CacheIndex<K, V> for SlotIndexedCache<K, V> {
    fn get(&self, key: &K) -> Option<V> {
        self.entries.lock().get(key).cloned()
    }

    fn put(&self, key: K, value: V) {
        self.entries.lock().put(key, value);
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }

    fn eviction_policy(&self) -> EvictionPolicy {
        EvictionPolicy::LeastRecentlyUsed {
            capacity: self.entries.lock().cap(),
        }
    }
}
