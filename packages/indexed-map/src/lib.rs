//! IndexedMap - concurrent key/value store with secondary indexes
//!
//! Records live in a primary store keyed by a case-insensitive primary key.
//! Any number of named secondary indexes, fixed at construction, derive a
//! lookup value from each record and keep buckets of matching keys, so
//! records can be fetched by attributes other than the primary key.
//!
//! ## Layers
//!
//! - **Primary store**: normalized key → record snapshot
//! - **Secondary store**: per index, normalized value → bucket of
//!   (normalized key → record snapshot)
//! - **Mutation protocol**: `put` / `remove` keep buckets consistent with
//!   the primary store (secondary first, primary last)
//! - **Bulk loader**: `put_all` fans large inputs out over rayon workers
//!
//! Every store composes a [`ConcurrentMap`]; `DashMap` is the default.
//! Consistency is relaxed while writers are in flight, see
//! [`IndexedMap`] for the exact contract.
//!
//! ## Usage
//!
//! ```rust
//! use indexed_map::{IndexRegistry, IndexedMap};
//!
//! #[derive(Clone)]
//! struct Person {
//!     last_name: String,
//!     ssn: String,
//! }
//!
//! let registry = IndexRegistry::builder()
//!     .index("LastName", |p: &Person| p.last_name.clone())
//!     .index("SSN", |p: &Person| p.ssn.clone())
//!     .build()
//!     .unwrap();
//! let persons = IndexedMap::new(registry);
//!
//! persons.put_int(1, Person { last_name: "Smith".into(), ssn: "123123123".into() });
//!
//! assert!(persons.get("1").is_some());
//! assert_eq!(persons.get_by_index("LastName", "smith").unwrap().len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod key;
pub mod map;
pub mod metrics;
pub mod registry;
pub mod store;
pub mod transition;

mod bulk;
mod indexed_map;

pub use config::{ConfigError, ConfigResult, IndexedMapConfig};
pub use error::{IndexError, IndexResult};
pub use indexed_map::IndexedMap;
pub use map::{ConcurrentMap, DashMapFamily, LockedMap, LockedMapFamily, MapFamily};
pub use metrics::StoreMetrics;
pub use registry::{IndexExtractor, IndexRegistry, IndexRegistryBuilder};

/// Value types that can be stored: cloned on the way out, shared across
/// threads while stored.
pub trait Record: Clone + Send + Sync + 'static {}

impl<T> Record for T where T: Clone + Send + Sync + 'static {}
