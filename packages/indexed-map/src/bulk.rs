//! Parallel bulk load
//!
//! Short inputs are applied on the calling thread. Inputs at or above the
//! configured threshold are split into contiguous chunks, one per worker,
//! and every chunk runs the regular `put` path for its elements. Workers
//! share nothing beyond the map itself; the call returns once every chunk
//! has been applied.

use crate::indexed_map::IndexedMap;
use crate::map::MapFamily;
use crate::Record;
use rayon::prelude::*;
use std::time::Instant;

impl<T, F> IndexedMap<T, F>
where
    T: Record,
    F: MapFamily,
{
    /// Put every record under the key computed by `key_fn`.
    ///
    /// Equivalent to calling [`put`](Self::put) for each element. With
    /// duplicate keys in a parallel load the surviving record is whichever
    /// worker wrote last. A panic in `key_fn` or an extractor propagates
    /// to the caller once the other workers finish.
    pub fn put_all<K>(&self, records: &[T], key_fn: K)
    where
        K: Fn(&T) -> String + Sync,
    {
        let count = records.len();
        let start = Instant::now();

        if count < self.config.parallel_threshold {
            tracing::debug!("bulk load of {} records runs sequentially", count);
            for record in records {
                self.put(&key_fn(record), record.clone());
            }
        } else {
            let workers = self.bulk_workers();
            let chunk_len = chunk_size(count, workers);
            tracing::debug!(
                "bulk load of {} records across {} workers (chunk size {})",
                count,
                workers,
                chunk_len
            );

            let load = || {
                records.par_chunks(chunk_len).for_each(|chunk| {
                    for record in chunk {
                        self.put(&key_fn(record), record.clone());
                    }
                })
            };
            match &self.pool {
                Some(pool) => pool.install(load),
                None => load(),
            }
        }

        if let Some(metrics) = &self.metrics {
            metrics.bulk_loads.inc();
        }
        tracing::info!(
            "bulk load completed (records={}, elapsed={:?})",
            count,
            start.elapsed()
        );
    }

    fn bulk_workers(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => self.config.effective_workers(),
        }
    }
}

/// Contiguous chunk length so that `workers` chunks cover `count` items.
fn chunk_size(count: usize, workers: usize) -> usize {
    let workers = workers.max(1);
    ((count + workers - 1) / workers).max(1)
}
