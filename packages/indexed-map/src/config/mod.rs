//! Tuning configuration
//!
//! The index registry is the only configuration that changes what the map
//! stores. The knobs here only decide how [`put_all`](crate::IndexedMap::put_all)
//! schedules its work.
//!
//! ```yaml
//! parallel_threshold: 10000
//! workers: 8
//! ```

mod error;

pub use error::{ConfigError, ConfigResult};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Inputs shorter than this are loaded on the calling thread.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 10_000;

/// Upper bound for an explicit worker count.
pub const MAX_WORKERS: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexedMapConfig {
    /// Minimum input length for a parallel bulk load (1..)
    pub parallel_threshold: usize,

    /// Bulk load workers (1..=1024). `None` uses one per hardware thread.
    pub workers: Option<usize>,
}

impl Default for IndexedMapConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            workers: None,
        }
    }
}

impl IndexedMapConfig {
    pub fn parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Worker count actually used for a parallel load.
    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.parallel_threshold == 0 {
            return Err(ConfigError::range_with_hint(
                "parallel_threshold",
                self.parallel_threshold,
                1,
                usize::MAX,
                "Use 1 to always load in parallel",
            ));
        }

        if let Some(workers) = self.workers {
            if workers == 0 || workers > MAX_WORKERS {
                return Err(ConfigError::range_with_hint(
                    "workers",
                    workers,
                    1,
                    MAX_WORKERS,
                    "Omit the field to use one worker per hardware thread",
                ));
            }
        }

        Ok(())
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
