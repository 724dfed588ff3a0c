//! Prometheus metrics for indexed map

use prometheus::{register_int_counter_with_registry, IntCounter, Opts, Registry};

/// Mutation and lookup counters, registered on a caller-owned registry.
#[derive(Clone)]
pub struct StoreMetrics {
    pub inserts: IntCounter,
    pub updates: IntCounter,
    pub removes: IntCounter,
    pub bucket_moves: IntCounter,
    pub index_lookups: IntCounter,
    pub bulk_loads: IntCounter,
}

impl StoreMetrics {
    pub fn new(registry: &Registry) -> prometheus::Result<Self> {
        Ok(Self {
            inserts: register_int_counter_with_registry!(
                Opts::new("indexed_map_inserts_total", "Puts of previously absent keys"),
                registry
            )?,
            updates: register_int_counter_with_registry!(
                Opts::new("indexed_map_updates_total", "Puts replacing an existing record"),
                registry
            )?,
            removes: register_int_counter_with_registry!(
                Opts::new("indexed_map_removes_total", "Removes of existing keys"),
                registry
            )?,
            bucket_moves: register_int_counter_with_registry!(
                Opts::new(
                    "indexed_map_bucket_moves_total",
                    "Keys moved between buckets of one index"
                ),
                registry
            )?,
            index_lookups: register_int_counter_with_registry!(
                Opts::new("indexed_map_index_lookups_total", "Secondary index lookups"),
                registry
            )?,
            bulk_loads: register_int_counter_with_registry!(
                Opts::new("indexed_map_bulk_loads_total", "put_all calls"),
                registry
            )?,
        })
    }
}
