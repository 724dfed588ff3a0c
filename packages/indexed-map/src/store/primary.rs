//! Primary store: normalized primary key → current record snapshot

use crate::map::{ConcurrentMap, MapFamily};
use crate::Record;
use std::sync::Arc;

/// Source of truth for which keys exist.
pub struct PrimaryStore<T, F>
where
    T: Record,
    F: MapFamily,
{
    records: F::Map<Arc<T>>,
}

impl<T, F> PrimaryStore<T, F>
where
    T: Record,
    F: MapFamily,
{
    pub fn new() -> Self {
        Self {
            records: Default::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        self.records.load(key)
    }

    pub fn put(&self, key: String, record: Arc<T>) {
        self.records.store(key, record);
    }

    pub fn delete(&self, key: &str) -> Option<Arc<T>> {
        self.records.delete(key)
    }

    /// Visit a snapshot of the current entries. No map guard is held while
    /// `f` runs, so `f` may write to the store.
    pub fn for_each<G>(&self, mut f: G)
    where
        G: FnMut(&str, &T),
    {
        for (key, record) in self.entries() {
            f(key.as_str(), &*record);
        }
    }

    /// Current (key, record) pairs, collected under the map guard.
    fn entries(&self) -> Vec<(String, Arc<T>)> {
        let mut entries = Vec::with_capacity(self.records.len());
        self.records
            .for_each(|key, record| entries.push((key.to_owned(), Arc::clone(record))));
        entries
    }

    pub fn keys(&self) -> Vec<String> {
        self.records.keys()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T, F> Default for PrimaryStore<T, F>
where
    T: Record,
    F: MapFamily,
{
    fn default() -> Self {
        Self::new()
    }
}
