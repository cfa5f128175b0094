//! Priority Cache - A bounded in-memory cache
//!
//! Evicts expired entries first, then the lowest priority, then the least
//! recently used within a priority.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::CacheStore;
pub use clock::{ManualClock, TimeSource, WallClock};
pub use config::{Config, ExpiryKind};
pub use error::{CacheError, Result};
pub use tasks::{share, spawn_sweep_task, SharedCache};
