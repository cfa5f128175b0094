//! Cache Entry Module
//!
//! Defines individual cache entries, their identifiers and the two orders
//! the eviction engine sorts them by.

use std::cmp::Ordering;

use serde::Serialize;

// == Entry Id ==
/// Stable handle to an entry stored in the [`EntryArena`](super::EntryArena).
///
/// The generation changes every time a slot is reused, so a handle kept by
/// one structure after the entry was removed through the other never
/// resolves to a newer entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId {
    pub(crate) slot: usize,
    pub(crate) generation: u32,
}

// == Cache Entry ==
/// One stored value instance. A key may own several live entries at once.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// Trimmed key
    pub key: String,
    /// The stored value
    pub value: V,
    /// Eviction priority, higher survives longer
    pub priority: u8,
    /// Absolute expiration timestamp (milliseconds)
    pub expire_at: i64,
    /// Operation counter at creation or last access; lower is older
    pub recency: u64,
    /// Operation counter at creation, never refreshed
    pub seq: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry stamped with `op` as both its recency and sequence.
    pub fn new(key: String, value: V, priority: u8, expire_at: i64, op: u64) -> Self {
        Self {
            key,
            value,
            priority,
            expire_at,
            recency: op,
            seq: op,
        }
    }

    // == Is Expired ==
    /// An entry is expired once `now` reaches its expiration time.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expire_at <= now
    }
}

// == Orderings ==
/// Ascending by expiration time; a missing entry sorts last.
pub fn expiry_order<V>(a: Option<&CacheEntry<V>>, b: Option<&CacheEntry<V>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.expire_at.cmp(&b.expire_at),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Descending by priority; a missing entry sorts last.
///
/// Ties are left equal here and resolved by the caller.
pub fn priority_order<V>(a: Option<&CacheEntry<V>>, b: Option<&CacheEntry<V>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.priority.cmp(&a.priority),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// == Expiry Item ==
/// What the expiry structures hold: the deadline plus a handle to the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExpiryItem {
    pub expire_at: i64,
    pub id: EntryId,
}

// == Entry View ==
/// Read-only, serializable view of a live entry.
#[derive(Debug, Clone, Serialize)]
pub struct EntryView<'a, V> {
    pub key: &'a str,
    pub value: &'a V,
    pub priority: u8,
    pub expire_at: i64,
    pub recency: u64,
}

impl<'a, V> From<&'a CacheEntry<V>> for EntryView<'a, V> {
    fn from(entry: &'a CacheEntry<V>) -> Self {
        Self {
            key: &entry.key,
            value: &entry.value,
            priority: entry.priority,
            expire_at: entry.expire_at,
            recency: entry.recency,
        }
    }
}
