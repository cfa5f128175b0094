//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Misses are not errors: lookups return `Option`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key is empty after trimming or too long
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Priority outside the accepted range
    #[error("Invalid priority: {0} (expected 0..={max})", max = crate::cache::MAX_PRIORITY)]
    InvalidPriority(u8),

    /// Configuration value could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CacheError::InvalidKey("empty".to_string()).to_string(),
            "Invalid key: empty"
        );
        assert_eq!(
            CacheError::InvalidPriority(101).to_string(),
            "Invalid priority: 101 (expected 0..=100)"
        );
        assert_eq!(
            CacheError::Config("CACHE_MAX_ITEMS".to_string()).to_string(),
            "Invalid configuration: CACHE_MAX_ITEMS"
        );
    }
}
