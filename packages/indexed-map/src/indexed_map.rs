//! Indexed map: mutation protocol and query API
//!
//! ## Consistency contract
//!
//! No operation takes a map-wide lock. Each single-key store operation is
//! atomic, and the protocol orders them so readers see a documented,
//! relaxed view:
//!
//! - **put**: every secondary bucket update finishes before the record is
//!   written to the primary store. A concurrent reader may find a record
//!   through `get_by_index` before `get` returns it, never the reverse.
//! - **remove**: the key is purged from every bucket before the primary
//!   entry is deleted. A concurrent reader may still `get` a record that
//!   no index returns anymore.
//! - Indexes are updated one after another, so a reader may see a record
//!   moved in one index and not yet in another.
//! - Concurrent puts to the same key are not serialized. Each one diffs
//!   against whatever the primary store held when it started, so racing
//!   writers can leave stale memberships until the key is written again.
//!
//! At quiescence every stored record is in exactly the bucket matching its
//! current value for each index, and in no bucket of an index for which
//! its value is empty.

use crate::config::IndexedMapConfig;
use crate::error::IndexResult;
use crate::key::{int_key, normalize};
use crate::map::{DashMapFamily, MapFamily};
use crate::metrics::StoreMetrics;
use crate::registry::IndexRegistry;
use crate::store::{PrimaryStore, SecondaryStore};
use crate::transition::IndexTransition;
use crate::Record;
use prometheus::Registry;
use std::fmt;
use std::sync::Arc;

/// Concurrent key/value store with secondary indexes.
///
/// Records are stored as immutable snapshots: `put` takes ownership,
/// lookups hand back clones. Keys and index values are compared
/// case-insensitively.
pub struct IndexedMap<T, F = DashMapFamily>
where
    T: Record,
    F: MapFamily,
{
    registry: IndexRegistry<T>,
    primary: PrimaryStore<T, F>,
    secondary: SecondaryStore<T, F>,
    pub(crate) config: IndexedMapConfig,
    pub(crate) pool: Option<rayon::ThreadPool>,
    pub(crate) metrics: Option<StoreMetrics>,
}

impl<T> IndexedMap<T, DashMapFamily>
where
    T: Record,
{
    /// Map backed by `DashMap` with default tuning.
    pub fn new(registry: IndexRegistry<T>) -> Self {
        Self::assemble(registry, IndexedMapConfig::default(), None)
    }

    /// Map backed by `DashMap` with validated tuning.
    pub fn with_config(registry: IndexRegistry<T>, config: IndexedMapConfig) -> IndexResult<Self> {
        Self::with_backend(registry, config)
    }
}

impl<T, F> IndexedMap<T, F>
where
    T: Record,
    F: MapFamily,
{
    /// Map backed by the map family `F`.
    pub fn with_backend(registry: IndexRegistry<T>, config: IndexedMapConfig) -> IndexResult<Self> {
        config.validate()?;
        let pool = match config.workers {
            Some(workers) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("indexed-map-load-{}", i))
                    .build()?,
            ),
            None => None,
        };
        Ok(Self::assemble(registry, config, pool))
    }

    fn assemble(
        registry: IndexRegistry<T>,
        config: IndexedMapConfig,
        pool: Option<rayon::ThreadPool>,
    ) -> Self {
        let secondary = SecondaryStore::new(&registry);
        tracing::info!(
            "indexed_map_initialized (indexes={}, parallel_threshold={})",
            registry.len(),
            config.parallel_threshold
        );
        Self {
            registry,
            primary: PrimaryStore::new(),
            secondary,
            config,
            pool,
            metrics: None,
        }
    }

    /// Register store counters on `registry` and record into them.
    pub fn with_metrics(mut self, registry: &Registry) -> IndexResult<Self> {
        self.metrics = Some(StoreMetrics::new(registry)?);
        Ok(self)
    }

    pub fn config(&self) -> &IndexedMapConfig {
        &self.config
    }

    pub fn metrics(&self) -> Option<&StoreMetrics> {
        self.metrics.as_ref()
    }

    pub fn index_names(&self) -> Vec<String> {
        self.registry.names().map(str::to_string).collect()
    }

    // ========================================================================
    // Mutation protocol
    // ========================================================================

    /// Insert or replace the record at `key` and re-derive every index
    /// membership from it. The primary store is written last.
    pub fn put(&self, key: &str, record: T) {
        let key = normalize(key);
        let record = Arc::new(record);
        let previous = self.primary.get(&key);

        let mut moves = 0;
        for index in self.secondary.indexes() {
            let new_value = index.value_of(&record);
            let old_value = previous
                .as_deref()
                .map(|prev| index.value_of(prev))
                .unwrap_or_default();

            let transition = IndexTransition::between(&old_value, &new_value);
            if matches!(transition, IndexTransition::Move { .. }) {
                moves += 1;
            }
            index.apply(transition, &key, &record);
        }

        self.primary.put(key, record);

        if let Some(metrics) = &self.metrics {
            if previous.is_some() {
                metrics.updates.inc();
            } else {
                metrics.inserts.inc();
            }
            metrics.bucket_moves.inc_by(moves);
        }
    }

    pub fn put_int(&self, key: i64, record: T) {
        self.put(&int_key(key), record);
    }

    /// Remove the record at `key`. Every bucket of every index is swept,
    /// not only the one matching the record's current value, then the
    /// primary entry is deleted.
    pub fn remove(&self, key: &str) -> Option<T> {
        let key = normalize(key);
        let existing = self.primary.get(&key)?;

        for index in self.secondary.indexes() {
            index.purge(&key);
        }
        // A racing remove may have deleted it already; report what we saw
        let removed = self.primary.delete(&key).unwrap_or(existing);

        tracing::trace!(
            "indexed_map removed record (indexes swept={})",
            self.secondary.len()
        );
        if let Some(metrics) = &self.metrics {
            metrics.removes.inc();
        }
        Some((*removed).clone())
    }

    pub fn remove_int(&self, key: i64) -> Option<T> {
        self.remove(&int_key(key))
    }

    // ========================================================================
    // Query API
    // ========================================================================

    pub fn get(&self, key: &str) -> Option<T> {
        self.primary
            .get(&normalize(key))
            .map(|record| (*record).clone())
    }

    pub fn get_int(&self, key: i64) -> Option<T> {
        self.get(&int_key(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.primary.get(&normalize(key)).is_some()
    }

    pub fn contains_key_int(&self, key: i64) -> bool {
        self.contains_key(&int_key(key))
    }

    /// Records whose value for index `name` equals `value`, unordered.
    /// An empty `value` never matches.
    pub fn get_by_index(&self, name: &str, value: &str) -> IndexResult<Vec<T>> {
        let index = self.secondary.index(name)?;
        if let Some(metrics) = &self.metrics {
            metrics.index_lookups.inc();
        }
        Ok(index.records(&normalize(value)))
    }

    /// Visit the records of one bucket.
    ///
    /// `f` sees a snapshot of the bucket taken when the call starts and runs
    /// with no lock held, so it may `put` or `remove` on this same map.
    pub fn for_each_in_bucket<G>(&self, name: &str, value: &str, f: G) -> IndexResult<()>
    where
        G: FnMut(&str, &T),
    {
        let index = self.secondary.index(name)?;
        index.for_each_in(&normalize(value), f);
        Ok(())
    }

    /// Number of keys currently in one bucket.
    pub fn index_size(&self, name: &str, value: &str) -> IndexResult<usize> {
        let index = self.secondary.index(name)?;
        Ok(index.bucket_len(&normalize(value)))
    }

    /// Values of index `name` that currently have at least one record.
    pub fn get_index_keys(&self, name: &str) -> IndexResult<Vec<String>> {
        Ok(self.secondary.index(name)?.populated_values())
    }

    /// Primary keys (normalized), unordered.
    pub fn keys(&self) -> Vec<String> {
        self.primary.keys()
    }

    /// Visit every stored record.
    ///
    /// `f` sees a snapshot of the primary store taken when the call starts
    /// and runs with no lock held, so it may `put` or `remove` on this same
    /// map. Entries written during the visit are not visited.
    pub fn for_each<G>(&self, f: G)
    where
        G: FnMut(&str, &T),
    {
        self.primary.for_each(f);
    }

    pub fn size(&self) -> usize {
        self.primary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }
}

impl<T, F> fmt::Debug for IndexedMap<T, F>
where
    T: Record,
    F: MapFamily,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedMap")
            .field("indexes", &self.index_names())
            .field("size", &self.size())
            .field("config", &self.config)
            .finish()
    }
}
