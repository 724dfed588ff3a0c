//! Error types for indexed map
//!
//! Absence of a key is never an error (lookups return `Option`). Errors
//! here are configuration mistakes: an index name that was never
//! registered, a malformed registry, invalid tuning, a metrics
//! registration clash, or a worker pool that failed to start.

use crate::config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Unknown index '{0}'")]
    UnknownIndex(String),

    #[error("Index name must not be empty")]
    EmptyIndexName,

    #[error("Index '{0}' registered more than once")]
    DuplicateIndex(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Metrics registration failed: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Bulk load pool could not be built: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type IndexResult<T> = Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_index_display() {
        let err = IndexError::UnknownIndex("SSN".to_string());
        assert_eq!(err.to_string(), "Unknown index 'SSN'");
    }

    #[test]
    fn test_duplicate_index_display() {
        let err = IndexError::DuplicateIndex("Type".to_string());
        assert!(err.to_string().contains("'Type'"));
    }

    #[test]
    fn test_from_config_error() {
        let config_err = ConfigError::range_with_hint("workers", 0, 1, 1024, "Use at least one worker");
        let err: IndexError = config_err.into();
        assert!(matches!(err, IndexError::Config(ConfigError::Range { .. })));
        assert!(err.to_string().contains("workers"));
    }

    #[test]
    fn test_from_prometheus_error() {
        let err: IndexError = prometheus::Error::AlreadyReg.into();
        assert!(matches!(err, IndexError::Metrics(_)));
    }

    #[test]
    fn test_result_propagation() {
        fn inner() -> IndexResult<()> {
            Err(IndexError::UnknownIndex("missing".to_string()))
        }

        fn outer() -> IndexResult<()> {
            inner()?;
            Ok(())
        }

        let err = outer().unwrap_err();
        assert!(matches!(err, IndexError::UnknownIndex(name) if name == "missing"));
    }
}
