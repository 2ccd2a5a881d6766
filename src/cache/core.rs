use crate::cache::config::{CacheConfig, DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR};
use crate::cache::metrics::CacheMetrics;
use crate::cache::policy::{EvictionPolicy, should_evict_eldest};
use crate::cache::sizing::initial_slots;
use crate::errors::CacheError;
use lru::LruCache;
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;

/// A value plus the logical clock reading of its last refresh.
#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    sequence: u64,
}

/// A bounded key-value cache with insertion-order or access-order (LRU) eviction.
///
/// The backing `LruCache` keeps entries in a doubly linked list ordered by sequence number,
/// so the eviction candidate is always its tail. Eviction is decided here, after each insert,
/// by `should_evict_eldest`; the list's own bound only tracks preallocation.
///
/// Not synchronized. `get` takes `&mut self` because under access order a hit reorders
/// the list; wrap in [`SharedCache`](crate::cache::SharedCache) to share between threads.
pub struct BoundedCache<K: Hash + Eq, V> {
    store: LruCache<K, Entry<V>>,
    capacity: usize,
    policy: EvictionPolicy,
    clock: u64,
    metrics: CacheMetrics,
}

impl<K: Hash + Eq, V> BoundedCache<K, V> {
    /// Creates an empty cache with default sizing hints.
    ///
    /// # Errors
    /// `InvalidConfiguration` if `capacity` is zero.
    pub fn new(policy: EvictionPolicy, capacity: usize) -> Result<Self, CacheError> {
        Self::with_tuning(policy, capacity, DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR)
    }

    /// Creates an empty cache with explicit sizing hints. `initial_capacity` and `load_factor`
    /// only decide how much room is preallocated; they never change which entries are evicted.
    ///
    /// # Errors
    /// `InvalidConfiguration` if `capacity` is zero, or if the policy is access order and
    /// `load_factor` is not a positive finite number.
    pub fn with_tuning(
        policy: EvictionPolicy,
        capacity: usize,
        initial_capacity: usize,
        load_factor: f32,
    ) -> Result<Self, CacheError> {
        Self::from_config(&CacheConfig { capacity, policy, initial_capacity, load_factor })
    }

    /// Creates an empty cache from a validated configuration.
    ///
    /// # Errors
    /// As [`CacheConfig::validate`].
    pub fn from_config(config: &CacheConfig) -> Result<Self, CacheError> {
        config.validate()?;
        let slots = initial_slots(config.capacity, config.initial_capacity, config.load_factor);
        let store = LruCache::new(NonZeroUsize::new(slots).unwrap_or(NonZeroUsize::MIN));
        log::debug!(
            target: "memolite::cache",
            "created cache policy={} capacity={} preallocated={}",
            config.policy,
            config.capacity,
            slots
        );
        Ok(Self {
            store,
            capacity: config.capacity,
            policy: config.policy,
            clock: 0,
            metrics: CacheMetrics::default(),
        })
    }

    /// Fixed-size cache evicting in insertion order.
    ///
    /// # Errors
    /// `InvalidConfiguration` if `capacity` is zero.
    pub fn insertion_order(capacity: usize) -> Result<Self, CacheError> {
        Self::new(EvictionPolicy::InsertionOrder, capacity)
    }

    /// Least-recently-used cache with an initial size hint, a maximum size and a load factor.
    ///
    /// # Errors
    /// `InvalidConfiguration` if `max_size` is zero or `load_factor` is not positive.
    pub fn access_order(
        initial_capacity: usize,
        max_size: usize,
        load_factor: f32,
    ) -> Result<Self, CacheError> {
        Self::with_tuning(EvictionPolicy::AccessOrder, max_size, initial_capacity, load_factor)
    }

    fn next_sequence(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Inserts or overwrites `key`, returning the previous value.
    ///
    /// An overwrite refreshes the entry's position only under access order. Inserting a new key
    /// into a full cache evicts exactly one entry, the eldest.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if self.store.contains(&key) {
            self.metrics.updates += 1;
            let entry = if self.policy.refreshes_on_overwrite() {
                let sequence = self.next_sequence();
                self.store.get_mut(&key).map(|entry| {
                    entry.sequence = sequence;
                    entry
                })
            } else {
                self.store.peek_mut(&key)
            };
            return entry.map(|entry| std::mem::replace(&mut entry.value, value));
        }
        self.insert_new(key, value);
        None
    }

    /// Grows the list's own bound ahead of a push so that it never evicts by itself.
    /// Bounds double from the sizing hint and top out at `capacity + 1`.
    fn reserve_slot(&mut self) {
        let bound = self.store.cap().get();
        if self.store.len() >= bound && bound <= self.capacity {
            let grown = bound.saturating_mul(2).min(self.capacity.saturating_add(1));
            self.store.resize(NonZeroUsize::new(grown).unwrap_or(NonZeroUsize::MIN));
        }
    }

    fn insert_new(&mut self, key: K, value: V) {
        self.reserve_slot();
        let sequence = self.next_sequence();
        let displaced = self.store.push(key, Entry { value, sequence });
        debug_assert!(displaced.is_none());
        self.metrics.inserts += 1;
        if should_evict_eldest(self.store.len(), self.capacity) {
            self.evict_eldest();
        }
    }

    fn evict_eldest(&mut self) {
        if let Some((_, entry)) = self.store.pop_lru() {
            self.metrics.evictions += 1;
            log::debug!(
                target: "memolite::cache",
                "evicted eldest entry sequence={} len={} capacity={}",
                entry.sequence,
                self.store.len(),
                self.capacity
            );
            crate::dev6!(
                "{{\"bench\":\"cache\",\"op\":\"evict\",\"policy\":\"{}\",\"sequence\":{}}}",
                self.policy,
                entry.sequence
            );
        }
    }

    /// Looks up `key`. Under access order a hit makes the entry the most recent; under
    /// insertion order this is a pure read. A miss never changes any ordering.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if !self.store.contains(key) {
            self.metrics.misses += 1;
            return None;
        }
        self.metrics.hits += 1;
        if self.policy.refreshes_on_read() {
            let sequence = self.next_sequence();
            self.store.get_mut(key).map(|entry| {
                entry.sequence = sequence;
                &entry.value
            })
        } else {
            self.store.peek(key).map(|entry| &entry.value)
        }
    }

    /// Reads `key` without touching order or counters, under every policy.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.peek(key).map(|entry| &entry.value)
    }

    /// Returns the cached value for `key`, computing and inserting it on a miss.
    pub fn get_or_insert_with<F>(&mut self, key: K, compute: F) -> &V
    where
        K: Clone,
        F: FnOnce() -> V,
    {
        if self.store.contains(&key) {
            self.metrics.hits += 1;
            if self.policy.refreshes_on_read() {
                let sequence = self.next_sequence();
                if let Some(entry) = self.store.get_mut(&key) {
                    entry.sequence = sequence;
                }
            }
        } else {
            self.metrics.misses += 1;
            let value = compute();
            self.insert_new(key.clone(), value);
        }
        // The entry was just hit or is the newest insert, which eviction never picks.
        self.store
            .peek(&key)
            .map(|entry| &entry.value)
            .expect("entry present after get_or_insert_with")
    }

    /// Deletes `key`, returning its value. Never evicts anything else.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.store.pop(key).map(|entry| entry.value);
        if removed.is_some() {
            self.metrics.removes += 1;
        }
        removed
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.contains(key)
    }

    /// Sequence number of `key`'s entry, if present.
    pub fn sequence_of<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.peek(key).map(|entry| entry.sequence)
    }

    /// The entry that the next eviction would remove.
    #[must_use]
    pub fn eldest(&self) -> Option<(&K, &V)> {
        self.store.peek_lru().map(|(k, entry)| (k, &entry.value))
    }

    /// Entries from eldest to most recent.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { inner: self.store.iter() }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Removes every entry. Counters are kept; the logical clock keeps running.
    pub fn clear(&mut self) {
        let dropped = self.store.len();
        self.store.clear();
        crate::dev6!("{{\"bench\":\"cache\",\"op\":\"clear\",\"dropped\":{}}}", dropped);
    }

    #[must_use]
    pub fn metrics(&self) -> CacheMetrics {
        self.metrics
    }

    pub fn reset_metrics(&mut self) {
        self.metrics = CacheMetrics::default();
    }
}

impl<K: Hash + Eq + fmt::Debug, V: fmt::Debug> fmt::Debug for BoundedCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedCache")
            .field("policy", &self.policy)
            .field("capacity", &self.capacity)
            .field("entries", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

/// Iterator over `(key, value)` from eldest to most recent.
pub struct Iter<'a, K, V> {
    inner: lru::Iter<'a, K, Entry<V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        // The list iterates most-recent first.
        self.inner.next_back().map(|(k, entry)| (k, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, entry)| (k, &entry.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K: Hash + Eq, V> IntoIterator for &'a BoundedCache<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys<V>(cache: &BoundedCache<&'static str, V>) -> Vec<&'static str> {
        cache.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn insertion_order_evicts_first_inserted() {
        let mut cache = BoundedCache::insertion_order(2).unwrap();
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);
        assert!(!cache.contains_key("a"));
        assert!(cache.contains_key("b"));
        assert!(cache.contains_key("c"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn access_order_evicts_least_recently_used() {
        let mut cache = BoundedCache::new(EvictionPolicy::AccessOrder, 2).unwrap();
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.get("a"), Some(&1));
        cache.put("c", 3);
        assert!(cache.contains_key("a"));
        assert!(!cache.contains_key("b"));
        assert!(cache.contains_key("c"));
    }

    #[test]
    fn insertion_order_get_does_not_reorder() {
        let mut cache = BoundedCache::insertion_order(3).unwrap();
        cache.put("a", 1);
        cache.put("b", 2);
        let before = cache.sequence_of("a");
        assert_eq!(cache.get("a"), Some(&1));
        assert_eq!(cache.sequence_of("a"), before);
        assert_eq!(keys(&cache), vec!["a", "b"]);
    }

    #[test]
    fn overwrite_keeps_position_under_insertion_order() {
        let mut cache = BoundedCache::insertion_order(2).unwrap();
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.put("a", 10), Some(1));
        assert_eq!(keys(&cache), vec!["a", "b"]);
        cache.put("c", 3);
        assert!(!cache.contains_key("a"));
        assert_eq!(keys(&cache), vec!["b", "c"]);
    }

    #[test]
    fn overwrite_refreshes_under_access_order() {
        let mut cache = BoundedCache::new(EvictionPolicy::AccessOrder, 2).unwrap();
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.put("a", 10), Some(1));
        assert_eq!(cache.len(), 2);
        cache.put("c", 3);
        assert_eq!(keys(&cache), vec!["a", "c"]);
        assert_eq!(cache.peek("a"), Some(&10));
    }

    #[test]
    fn access_order_hit_becomes_maximum_sequence() {
        let mut cache = BoundedCache::new(EvictionPolicy::AccessOrder, 3).unwrap();
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);
        cache.get("a");
        let a = cache.sequence_of("a").unwrap();
        assert!(a > cache.sequence_of("b").unwrap());
        assert!(a > cache.sequence_of("c").unwrap());
        assert_eq!(cache.eldest(), Some((&"b", &2)));
    }

    #[test]
    fn miss_changes_nothing() {
        let mut cache = BoundedCache::new(EvictionPolicy::AccessOrder, 3).unwrap();
        cache.put("a", 1);
        cache.put("b", 2);
        let seqs: Vec<_> = ["a", "b"].iter().map(|k| cache.sequence_of(k)).collect();
        assert_eq!(cache.get("zzz"), None);
        assert_eq!(cache.len(), 2);
        let after: Vec<_> = ["a", "b"].iter().map(|k| cache.sequence_of(k)).collect();
        assert_eq!(seqs, after);
        assert_eq!(cache.metrics().misses, 1);
    }

    #[test]
    fn capacity_one_holds_one_entry() {
        let mut cache = BoundedCache::insertion_order(1).unwrap();
        for _ in 0..5 {
            cache.put("same", 1);
        }
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.metrics().evictions, 0);
        cache.put("other", 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains_key("other"));
        assert!(!cache.contains_key("same"));
    }

    #[test]
    fn zero_capacity_is_invalid() {
        let err = BoundedCache::<u32, u32>::insertion_order(0).unwrap_err();
        assert!(err.is_invalid_configuration());
        let err = BoundedCache::<u32, u32>::access_order(16, 0, 0.75).unwrap_err();
        assert!(err.is_invalid_configuration());
        let err = BoundedCache::<u32, u32>::access_order(16, 4, 0.0).unwrap_err();
        assert!(err.is_invalid_configuration());
    }

    #[test]
    fn remove_never_evicts_others() {
        let mut cache = BoundedCache::insertion_order(2).unwrap();
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.remove("a"), Some(1));
        assert_eq!(cache.remove("a"), None);
        assert_eq!(keys(&cache), vec!["b"]);
        cache.put("c", 3);
        assert_eq!(keys(&cache), vec!["b", "c"]);
        assert_eq!(cache.metrics().evictions, 0);
        assert_eq!(cache.metrics().removes, 1);
    }

    #[test]
    fn get_or_insert_with_memoizes() {
        let mut cache = BoundedCache::new(EvictionPolicy::AccessOrder, 2).unwrap();
        let mut calls = 0;
        let v = *cache.get_or_insert_with("k", || {
            calls += 1;
            42
        });
        assert_eq!(v, 42);
        let v = *cache.get_or_insert_with("k", || {
            calls += 1;
            0
        });
        assert_eq!(v, 42);
        assert_eq!(calls, 1);
        let m = cache.metrics();
        assert_eq!((m.hits, m.misses, m.inserts), (1, 1, 1));
    }

    #[test]
    fn get_or_insert_with_on_capacity_one_keeps_new_entry() {
        let mut cache = BoundedCache::insertion_order(1).unwrap();
        cache.put("old", 1);
        assert_eq!(*cache.get_or_insert_with("new", || 2), 2);
        assert_eq!(keys(&cache), vec!["new"]);
    }

    #[test]
    fn iter_is_double_ended_and_exact() {
        let mut cache = BoundedCache::insertion_order(3).unwrap();
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);
        let it = cache.iter();
        assert_eq!(it.len(), 3);
        let rev: Vec<_> = cache.iter().rev().map(|(k, _)| *k).collect();
        assert_eq!(rev, vec!["c", "b", "a"]);
    }

    #[test]
    fn clear_empties_but_keeps_counting_sequences() {
        let mut cache = BoundedCache::insertion_order(2).unwrap();
        cache.put("a", 1);
        cache.clear();
        assert!(cache.is_empty());
        cache.put("b", 2);
        assert_eq!(cache.sequence_of("b"), Some(2));
    }

    #[test]
    fn eviction_emits_dev6_line() {
        let _g = crate::utils::devlog::enable_thread_sink();
        let mut cache = BoundedCache::insertion_order(1).unwrap();
        cache.put(1u8, "x");
        cache.put(2u8, "y");
        let lines = crate::utils::devlog::drain();
        assert!(lines.iter().any(|l| l.contains("\"op\":\"evict\"") && l.contains("\"sequence\":1")));
    }
}
