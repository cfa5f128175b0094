//! Cache Module
//!
//! Provides an in-memory cache evicting expired entries first, then the
//! lowest priority, then the least recently used.

mod arena;
mod chunked;
mod entry;
mod expiry;
mod index;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use arena::EntryArena;
pub use chunked::{ChunkedExpiryList, DEFAULT_BLOCK_SIZE};
pub use entry::{expiry_order, priority_order, CacheEntry, EntryId, EntryView, ExpiryItem};
pub use expiry::{ExpiryQueue, ExpiryStructure, LOAD_FACTOR};
pub use index::PriorityIndex;
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Lowest accepted priority
pub const MIN_PRIORITY: u8 = 0;

/// Highest accepted priority
pub const MAX_PRIORITY: u8 = 100;
