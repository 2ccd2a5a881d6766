use crate::cache::config::CacheConfig;
use crate::cache::core::BoundedCache;
use crate::cache::metrics::CacheMetrics;
use crate::cache::policy::EvictionPolicy;
use crate::errors::CacheError;
use parking_lot::Mutex;
use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;

/// A cloneable handle to one `BoundedCache` shared between callers.
///
/// Every method holds the lock for exactly one logical operation. Values leave the lock as
/// clones, so no caller can reach back into the cache's ordering.
pub struct SharedCache<K: Hash + Eq, V> {
    inner: Arc<Mutex<BoundedCache<K, V>>>,
}

impl<K: Hash + Eq, V> Clone for SharedCache<K, V> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<K: Hash + Eq, V> From<BoundedCache<K, V>> for SharedCache<K, V> {
    fn from(cache: BoundedCache<K, V>) -> Self {
        Self { inner: Arc::new(Mutex::new(cache)) }
    }
}

impl<K: Hash + Eq, V: Clone> SharedCache<K, V> {
    /// # Errors
    /// `InvalidConfiguration` if `capacity` is zero.
    pub fn new(policy: EvictionPolicy, capacity: usize) -> Result<Self, CacheError> {
        Ok(BoundedCache::new(policy, capacity)?.into())
    }

    /// # Errors
    /// As [`CacheConfig::validate`].
    pub fn from_config(config: &CacheConfig) -> Result<Self, CacheError> {
        Ok(BoundedCache::from_config(config)?.into())
    }

    pub fn put(&self, key: K, value: V) -> Option<V> {
        self.inner.lock().put(key, value)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().get(key).cloned()
    }

    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().peek(key).cloned()
    }

    /// Memoizes `compute` under the lock, so concurrent callers for the same key compute once.
    ///
    /// The lock is not reentrant: `compute` must not call back into this cache or any clone of
    /// this handle, or it deadlocks.
    pub fn get_or_insert_with<F>(&self, key: K, compute: F) -> V
    where
        K: Clone,
        F: FnOnce() -> V,
    {
        self.inner.lock().get_or_insert_with(key, compute).clone()
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().remove(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    #[must_use]
    pub fn metrics(&self) -> CacheMetrics {
        self.inner.lock().metrics()
    }

    /// Runs `f` with exclusive access, e.g. to iterate or to combine several operations.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut BoundedCache<K, V>) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut *guard)
    }

    /// Clones out the entries, eldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(K, V)>
    where
        K: Clone,
    {
        self.inner.lock().iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}
