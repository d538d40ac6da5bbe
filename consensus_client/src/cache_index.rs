use core::num::NonZeroUsize;

use parse_display::Display;

/// How an index makes room when it is full.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display)]
pub enum EvictionPolicy {
    #[display("least recently used (capacity: {capacity})")]
    LeastRecentlyUsed { capacity: NonZeroUsize },
    #[display("lowest key (capacity: {capacity})")]
    LowestKey { capacity: NonZeroUsize },
    #[display("none")]
    Unbounded,
}

/// A key-value index that can be shared between tasks.
///
/// Methods take `&self`. Implementations synchronize internally and never hold a lock once a
/// method returns, so callers may await freely between calls.
pub trait CacheIndex<K, V> {
    fn get(&self, key: &K) -> Option<V>;

    fn put(&self, key: K, value: V);

    fn len(&self) -> usize;

    fn eviction_policy(&self) -> EvictionPolicy;
}
