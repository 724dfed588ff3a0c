//! Concurrent map capability
//!
//! The engine composes an existing concurrent hash map instead of
//! implementing one. Everything it needs from that map is captured by
//! [`ConcurrentMap`]: atomic single-key load/store/delete, an atomic
//! insert-if-absent, and a weakly-consistent iteration.
//!
//! Backends are selected per [`IndexedMap`](crate::IndexedMap) through a
//! [`MapFamily`], which maps a value type to a concrete map type:
//!
//! - [`DashMapFamily`]: sharded, lock-striped `DashMap` (default)
//! - [`LockedMapFamily`]: one `parking_lot::RwLock<HashMap>` per map

use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;

/// String-keyed concurrent map.
///
/// Single-key operations are atomic. Iteration is best effort: entries
/// inserted or removed while [`for_each`](ConcurrentMap::for_each) runs may
/// or may not be visited, and there is no point-in-time snapshot.
pub trait ConcurrentMap<V>: Default + Send + Sync {
    /// Current value for `key`, if any.
    fn load(&self, key: &str) -> Option<V>;

    /// Insert or replace the value for `key`.
    fn store(&self, key: String, value: V);

    /// Remove `key`, returning the value it held.
    fn delete(&self, key: &str) -> Option<V>;

    /// Return the value for `key`, inserting `make()` if absent.
    ///
    /// When several callers race on the same absent key exactly one value
    /// wins and every caller gets that value back.
    fn load_or_store_with<F>(&self, key: &str, make: F) -> V
    where
        F: FnOnce() -> V;

    /// Visit every entry. `f` must not mutate this same map.
    fn for_each<F>(&self, f: F)
    where
        F: FnMut(&str, &V);

    /// Number of entries (best effort under concurrent mutation).
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys currently present, in iteration order.
    fn keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.len());
        self.for_each(|key, _| keys.push(key.to_owned()));
        keys
    }
}

/// Selects the concrete map type used for every store of an indexed map.
pub trait MapFamily: Send + Sync + 'static {
    type Map<V>: ConcurrentMap<V>
    where
        V: Clone + Send + Sync + 'static;
}

/// `DashMap`-backed maps (sharded, lock-striped).
#[derive(Debug, Clone, Copy, Default)]
pub struct DashMapFamily;

impl MapFamily for DashMapFamily {
    type Map<V> = DashMap<String, V>
    where
        V: Clone + Send + Sync + 'static;
}

/// Single-lock maps. Slower under contention, but every operation is
/// trivially linearizable, which makes it a useful reference backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct LockedMapFamily;

impl MapFamily for LockedMapFamily {
    type Map<V> = LockedMap<V>
    where
        V: Clone + Send + Sync + 'static;
}

impl<V> ConcurrentMap<V> for DashMap<String, V>
where
    V: Clone + Send + Sync,
{
    fn load(&self, key: &str) -> Option<V> {
        self.get(key).map(|entry| entry.value().clone())
    }

    fn store(&self, key: String, value: V) {
        self.insert(key, value);
    }

    fn delete(&self, key: &str) -> Option<V> {
        self.remove(key).map(|(_, value)| value)
    }

    fn load_or_store_with<F>(&self, key: &str, make: F) -> V
    where
        F: FnOnce() -> V,
    {
        // Read lock first; the write lock is only taken for absent keys
        if let Some(existing) = self.get(key) {
            return existing.value().clone();
        }
        self.entry(key.to_owned()).or_insert_with(make).value().clone()
    }

    fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&str, &V),
    {
        for entry in self.iter() {
            f(entry.key().as_str(), entry.value());
        }
    }

    fn len(&self) -> usize {
        DashMap::len(self)
    }

    fn is_empty(&self) -> bool {
        DashMap::is_empty(self)
    }
}

/// `HashMap` behind one `RwLock`.
pub struct LockedMap<V> {
    inner: RwLock<HashMap<String, V>>,
}

impl<V> Default for LockedMap<V> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> ConcurrentMap<V> for LockedMap<V>
where
    V: Clone + Send + Sync,
{
    fn load(&self, key: &str) -> Option<V> {
        self.inner.read().get(key).cloned()
    }

    fn store(&self, key: String, value: V) {
        self.inner.write().insert(key, value);
    }

    fn delete(&self, key: &str) -> Option<V> {
        self.inner.write().remove(key)
    }

    fn load_or_store_with<F>(&self, key: &str, make: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(existing) = self.inner.read().get(key) {
            return existing.clone();
        }
        self.inner
            .write()
            .entry(key.to_owned())
            .or_insert_with(make)
            .clone()
    }

    fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&str, &V),
    {
        let guard = self.inner.read();
        for (key, value) in guard.iter() {
            f(key.as_str(), value);
        }
    }

    fn len(&self) -> usize {
        self.inner.read().len()
    }
}
