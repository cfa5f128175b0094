//! Configuration Module
//!
//! Handles loading the demo's cache configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::DEFAULT_BLOCK_SIZE;
use crate::error::{CacheError, Result};

/// Which structure keeps entries in deadline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryKind {
    /// Binary min-heap
    #[default]
    Heap,
    /// Block-structured list for uniform TTLs
    Chunked,
}

impl FromStr for ExpiryKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heap" => Ok(Self::Heap),
            "chunked" => Ok(Self::Chunked),
            other => Err(CacheError::Config(format!(
                "unknown expiry structure '{}'",
                other
            ))),
        }
    }
}

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_items: usize,
    /// Structure holding entries in deadline order
    pub expiry_structure: ExpiryKind,
    /// Items per block when the chunked list is used
    pub block_size: usize,
    /// Background sweep interval in milliseconds
    pub sweep_interval_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// Unparseable values fall back to their defaults.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ITEMS` - Maximum cache entries (default: 5)
    /// - `CACHE_EXPIRY_STRUCTURE` - `heap` or `chunked` (default: heap)
    /// - `CACHE_BLOCK_SIZE` - Chunked list block size (default: 1024)
    /// - `CACHE_SWEEP_INTERVAL_MS` - Sweep frequency in ms (default: 1000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_items: env::var("CACHE_MAX_ITEMS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_items),
            expiry_structure: env::var("CACHE_EXPIRY_STRUCTURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.expiry_structure),
            block_size: env::var("CACHE_BLOCK_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.block_size),
            sweep_interval_ms: env::var("CACHE_SWEEP_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sweep_interval_ms),
        }
    }

    /// Like [`Config::from_env`], but reports unparseable values.
    ///
    /// # Errors
    /// [`CacheError::Config`] naming the first variable that failed to parse.
    pub fn try_from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            max_items: parse_var("CACHE_MAX_ITEMS")?.unwrap_or(defaults.max_items),
            expiry_structure: parse_var("CACHE_EXPIRY_STRUCTURE")?
                .unwrap_or(defaults.expiry_structure),
            block_size: parse_var("CACHE_BLOCK_SIZE")?.unwrap_or(defaults.block_size),
            sweep_interval_ms: parse_var("CACHE_SWEEP_INTERVAL_MS")?
                .unwrap_or(defaults.sweep_interval_ms),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_items: 5,
            expiry_structure: ExpiryKind::Heap,
            block_size: DEFAULT_BLOCK_SIZE,
            sweep_interval_ms: 1000,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CacheError::Config(format!("{}='{}'", name, raw))),
        Err(_) => Ok(None),
    }
}
