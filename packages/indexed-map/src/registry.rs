//! Index registry
//!
//! Fixed mapping from index name to extraction function, captured once at
//! construction and shared read-only by every store afterwards. There is no
//! way to add, drop, or change an index on a live map.

use crate::error::{IndexError, IndexResult};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Computes an index value from a record.
///
/// Extractors must be deterministic and total. An empty result means the
/// record does not participate in the index.
pub trait IndexExtractor<T>: Send + Sync {
    fn extract(&self, record: &T) -> String;
}

impl<T, F> IndexExtractor<T> for F
where
    F: Fn(&T) -> String + Send + Sync,
{
    fn extract(&self, record: &T) -> String {
        self(record)
    }
}

/// Immutable set of named indexes for records of type `T`.
pub struct IndexRegistry<T> {
    indexes: BTreeMap<String, Arc<dyn IndexExtractor<T>>>,
}

impl<T> IndexRegistry<T> {
    pub fn builder() -> IndexRegistryBuilder<T> {
        IndexRegistryBuilder {
            indexes: Vec::new(),
        }
    }

    /// Registry without secondary indexes
    pub fn empty() -> Self {
        Self {
            indexes: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.indexes.contains_key(name)
    }

    /// Index names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.indexes.keys().map(String::as_str)
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, &Arc<dyn IndexExtractor<T>>)> {
        self.indexes
            .iter()
            .map(|(name, extractor)| (name.as_str(), extractor))
    }

    pub fn extractor(&self, name: &str) -> IndexResult<&dyn IndexExtractor<T>> {
        self.indexes
            .get(name)
            .map(|extractor| extractor.as_ref())
            .ok_or_else(|| IndexError::UnknownIndex(name.to_string()))
    }
}

impl<T> fmt::Debug for IndexRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexRegistry")
            .field("indexes", &self.indexes.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Collects index definitions; validation happens in [`build`](Self::build).
pub struct IndexRegistryBuilder<T> {
    indexes: Vec<(String, Arc<dyn IndexExtractor<T>>)>,
}

impl<T> IndexRegistryBuilder<T> {
    /// Register an index backed by a closure.
    pub fn index<F>(self, name: impl Into<String>, extract: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.index_with(name, extract)
    }

    /// Register an index backed by any [`IndexExtractor`].
    pub fn index_with<E>(mut self, name: impl Into<String>, extractor: E) -> Self
    where
        E: IndexExtractor<T> + 'static,
    {
        self.indexes.push((name.into(), Arc::new(extractor)));
        self
    }

    pub fn build(self) -> IndexResult<IndexRegistry<T>> {
        let mut indexes = BTreeMap::new();
        for (name, extractor) in self.indexes {
            if name.trim().is_empty() {
                return Err(IndexError::EmptyIndexName);
            }
            if indexes.contains_key(&name) {
                return Err(IndexError::DuplicateIndex(name));
            }
            indexes.insert(name, extractor);
        }
        Ok(IndexRegistry { indexes })
    }
}
