//! Secondary index store
//!
//! One map per index name, from normalized index value to a bucket. A
//! bucket is itself a concurrent map from normalized primary key to the
//! record snapshot, so bucket members can be added and removed without
//! touching any other bucket.
//!
//! Buckets are created lazily by the mutation path through an atomic
//! insert-if-absent, so one (index, value) pair never has two bucket
//! objects. Read paths never create buckets. Emptied buckets are kept:
//! dropping one could race with a writer that already holds it.

use crate::error::{IndexError, IndexResult};
use crate::key::normalize;
use crate::map::{ConcurrentMap, MapFamily};
use crate::registry::{IndexExtractor, IndexRegistry};
use crate::transition::IndexTransition;
use crate::Record;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Primary key → record snapshot, for one (index, value) pair.
pub type Bucket<T, F> = <F as MapFamily>::Map<Arc<T>>;

/// Buckets of a single index.
pub struct SecondaryIndex<T, F>
where
    T: Record,
    F: MapFamily,
{
    name: String,
    extractor: Arc<dyn IndexExtractor<T>>,
    buckets: F::Map<Arc<Bucket<T, F>>>,
}

impl<T, F> SecondaryIndex<T, F>
where
    T: Record,
    F: MapFamily,
{
    fn new(name: &str, extractor: Arc<dyn IndexExtractor<T>>) -> Self {
        Self {
            name: name.to_string(),
            extractor,
            buckets: Default::default(),
        }
    }

    /// Normalized index value of `record`.
    pub fn value_of(&self, record: &T) -> String {
        normalize(&self.extractor.extract(record))
    }

    fn bucket(&self, value: &str) -> Option<Arc<Bucket<T, F>>> {
        self.buckets.load(value)
    }

    fn bucket_or_create(&self, value: &str) -> Arc<Bucket<T, F>> {
        self.buckets
            .load_or_store_with(value, || Arc::new(Default::default()))
    }

    /// Add `key` to the bucket for `value`. `value` must be non-empty.
    pub fn insert(&self, value: &str, key: String, record: Arc<T>) {
        debug_assert!(!value.is_empty(), "empty index values have no bucket");
        self.bucket_or_create(value).store(key, record);
    }

    /// Remove `key` from the bucket for `value`, if that bucket exists.
    pub fn delete(&self, value: &str, key: &str) {
        if let Some(bucket) = self.bucket(value) {
            bucket.delete(key);
        }
    }

    /// Remove `key` from every bucket of this index.
    pub fn purge(&self, key: &str) {
        self.buckets.for_each(|_, bucket| {
            bucket.delete(key);
        });
    }

    /// Apply one transition for `key`. The new bucket is written before the
    /// stale one is cleared, so a moving key is never absent from both.
    pub fn apply(&self, transition: IndexTransition<'_>, key: &str, record: &Arc<T>) {
        tracing::trace!("index {}: {}", self.name, transition.label());
        if let Some(target) = transition.target() {
            self.insert(target, key.to_string(), Arc::clone(record));
        }
        if let Some(stale) = transition.stale() {
            self.delete(stale, key);
        }
    }

    /// Copies of every record in the bucket for `value`, unordered.
    pub fn records(&self, value: &str) -> Vec<T> {
        let mut records = Vec::new();
        if let Some(bucket) = self.bucket(value) {
            bucket.for_each(|_, record| records.push((**record).clone()));
        }
        records
    }

    /// Visit a snapshot of one bucket. The bucket guard is released before
    /// `f` runs, so `f` may put or remove through the owning map.
    pub fn for_each_in<G>(&self, value: &str, mut f: G)
    where
        G: FnMut(&str, &T),
    {
        let Some(bucket) = self.bucket(value) else {
            return;
        };
        let mut members = Vec::with_capacity(bucket.len());
        bucket.for_each(|key, record| members.push((key.to_owned(), Arc::clone(record))));

        for (key, record) in members {
            f(key.as_str(), &*record);
        }
    }

    /// Number of keys in the bucket for `value`.
    pub fn bucket_len(&self, value: &str) -> usize {
        self.bucket(value).map(|bucket| bucket.len()).unwrap_or(0)
    }

    /// Values whose bucket currently holds at least one key.
    pub fn populated_values(&self) -> Vec<String> {
        let mut values = Vec::new();
        self.buckets.for_each(|value, bucket| {
            if !bucket.is_empty() {
                values.push(value.to_string());
            }
        });
        values
    }
}

/// Every secondary index, keyed by index name.
pub struct SecondaryStore<T, F>
where
    T: Record,
    F: MapFamily,
{
    indexes: BTreeMap<String, SecondaryIndex<T, F>>,
}

impl<T, F> SecondaryStore<T, F>
where
    T: Record,
    F: MapFamily,
{
    pub fn new(registry: &IndexRegistry<T>) -> Self {
        let indexes = registry
            .entries()
            .map(|(name, extractor)| {
                (
                    name.to_string(),
                    SecondaryIndex::new(name, Arc::clone(extractor)),
                )
            })
            .collect();
        Self { indexes }
    }

    pub fn index(&self, name: &str) -> IndexResult<&SecondaryIndex<T, F>> {
        self.indexes
            .get(name)
            .ok_or_else(|| IndexError::UnknownIndex(name.to_string()))
    }

    pub fn indexes(&self) -> impl Iterator<Item = &SecondaryIndex<T, F>> {
        self.indexes.values()
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}
