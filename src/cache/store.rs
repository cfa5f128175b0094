//! Cache Store Module
//!
//! Eviction engine combining the entry arena, an expiry-ordered structure
//! and the priority index.

use tracing::{debug, warn};

use crate::cache::{
    expiry_order, CacheEntry, ChunkedExpiryList, EntryArena, EntryId, EntryView, ExpiryItem,
    ExpiryQueue, ExpiryStructure, PriorityIndex, LOAD_FACTOR, MAX_KEY_LENGTH, MAX_PRIORITY,
};
use crate::clock::{TimeSource, WallClock};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Bounded cache with expiry, priority and LRU eviction.
///
/// Setting a key never overwrites: each `set` adds a new entry that shadows
/// the older ones until they expire or are evicted. Reads answer with the
/// highest priority entry for the key, the newest one on a tie.
///
/// Eviction runs in two phases. Expired entries are swept first, in deadline
/// order. If the cache is still over capacity, the entry with the lowest
/// priority is removed, the least recently used one on a tie, one at a time.
///
/// The store is single-threaded; wrap it in a lock to share it (see
/// [`SharedCache`](crate::tasks::SharedCache)).
#[derive(Debug)]
pub struct CacheStore<V, C = WallClock, S = ExpiryQueue<ExpiryItem>> {
    /// Owner of every live entry
    arena: EntryArena<V>,
    /// Per-key sequences and eviction ladder
    index: PriorityIndex,
    /// Deadlines, possibly holding stale ids of entries evicted by priority
    expiry: S,
    /// Capacity ceiling
    max_items: usize,
    /// Source of recency tokens
    op_counter: u64,
    clock: C,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates a heap-backed store reading the wall clock.
    pub fn new(max_items: usize) -> Self {
        Self::with_clock(max_items, WallClock)
    }
}

impl<V, C: TimeSource> CacheStore<V, C> {
    /// Creates a heap-backed store reading `clock`.
    pub fn with_clock(max_items: usize, clock: C) -> Self {
        Self::with_structure(max_items, clock, ExpiryQueue::with_capacity(max_items))
    }
}

impl<V, C: TimeSource> CacheStore<V, C, ChunkedExpiryList<ExpiryItem>> {
    /// Creates a store whose deadlines live in a chunked list.
    ///
    /// Suited to workloads where entries arrive in non-decreasing deadline
    /// order, such as a single shared TTL.
    pub fn with_chunked_list(max_items: usize, block_size: usize, clock: C) -> Self {
        Self::with_structure(max_items, clock, ChunkedExpiryList::new(block_size))
    }
}

impl<V, C, S> CacheStore<V, C, S>
where
    C: TimeSource,
    S: ExpiryStructure<ExpiryItem>,
{
    /// Creates a store over an arbitrary expiry structure.
    pub fn with_structure(max_items: usize, clock: C, expiry: S) -> Self {
        Self {
            arena: EntryArena::with_capacity(max_items),
            index: PriorityIndex::new(),
            expiry,
            max_items,
            op_counter: 0,
            clock,
        }
    }

    // == Get ==
    /// Retrieves the value answering for `key` and marks it recently used.
    ///
    /// If the answering entry has expired, expired entries are swept and the
    /// key is looked up again.
    pub fn get(&mut self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let key = key.trim();
        let mut id = self.index.head(key)?;

        let now = self.clock.now_millis();
        if self.is_expired(id, now) {
            self.sweep_expired(now);
            id = self.index.head(key)?;
        }

        self.op_counter += 1;
        let recency = self.op_counter;
        let entry = self.arena.get_mut(id)?;
        let previous = std::mem::replace(&mut entry.recency, recency);
        let priority = entry.priority;
        let value = entry.value.clone();
        self.index.touch(id, priority, previous, recency);

        Some(value)
    }

    // == Set ==
    /// Stores `value` under `key` with a priority and a TTL in seconds.
    ///
    /// Older entries for the same key stay live and keep their own priority
    /// and deadline. A negative TTL is treated as already expired. Room is
    /// made before the entry is stored, so the item count never exceeds
    /// `max_items` once this returns.
    ///
    /// # Errors
    /// - [`CacheError::InvalidKey`] if the key is empty after trimming or
    ///   longer than [`MAX_KEY_LENGTH`]
    /// - [`CacheError::InvalidPriority`] if `priority` exceeds [`MAX_PRIORITY`]
    pub fn set(&mut self, key: &str, value: V, priority: u8, ttl_seconds: i64) -> Result<()> {
        let key = validate_key(key)?;
        if priority > MAX_PRIORITY {
            warn!("Rejected priority {} for key '{}'", priority, key);
            return Err(CacheError::InvalidPriority(priority));
        }

        let now = self.clock.now_millis();
        let expire_at = now.saturating_add(ttl_seconds.max(0).saturating_mul(1000));
        self.op_counter += 1;
        let op = self.op_counter;

        if self.max_items == 0 {
            debug!("Capacity is zero, dropping entry for key '{}'", key);
            return Ok(());
        }

        // The incoming entry counts toward capacity before it is stored.
        if self.arena.len() + 1 >= self.max_items {
            self.evict_items(1);
        }

        let id = self
            .arena
            .insert(CacheEntry::new(key, value, priority, expire_at, op));
        self.expiry.push(ExpiryItem { expire_at, id });
        self.index.insert(&self.arena, id);
        self.compact_expiry();

        Ok(())
    }

    // == Set Max Items ==
    /// Changes the capacity ceiling, evicting immediately when shrinking
    /// below the current item count. Zero empties the cache.
    pub fn set_max_items(&mut self, max_items: usize) {
        self.max_items = max_items;
        if max_items < self.arena.len() {
            self.evict_items(0);
        }
        self.compact_expiry();
    }

    // == Keys ==
    /// Distinct keys currently stored, sorted.
    ///
    /// Does not sweep, so keys whose entries expired but were not yet
    /// evicted are still listed.
    pub fn keys(&self) -> Vec<String> {
        self.index.keys()
    }

    // == Evict Expired ==
    /// Removes every entry whose deadline has passed.
    ///
    /// Returns the number of entries removed.
    pub fn evict_expired(&mut self) -> usize {
        let now = self.clock.now_millis();
        self.sweep_expired(now)
    }

    // == Inspection ==
    /// Number of live entries, shadowed ones included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Number of live entries stored under `key`.
    pub fn shadow_count(&self, key: &str) -> usize {
        self.index.entries(key.trim()).len()
    }

    /// Items held by the expiry structure, stale ones included.
    pub fn expiry_len(&self) -> usize {
        self.expiry.len()
    }

    /// Upper bound on [`expiry_len`](Self::expiry_len) between calls.
    pub fn expiry_limit(&self) -> usize {
        self.max_items.max(1).saturating_mul(LOAD_FACTOR)
    }

    /// Live entries in deadline order, oldest insertion first on a tie.
    pub fn snapshot(&self) -> Vec<EntryView<'_, V>> {
        let mut entries: Vec<&CacheEntry<V>> = self.arena.iter().map(|(_, e)| e).collect();
        entries.sort_by(|a, b| expiry_order(Some(*a), Some(*b)).then(a.seq.cmp(&b.seq)));
        entries.into_iter().map(EntryView::from).collect()
    }

    // == Eviction ==
    /// Sweeps expired entries, then evicts by priority until `reserve` more
    /// entries fit under the ceiling.
    fn evict_items(&mut self, reserve: usize) {
        let now = self.clock.now_millis();
        self.sweep_expired(now);

        while self.arena.len() + reserve > self.max_items {
            if !self.evict_lowest() {
                break;
            }
        }
    }

    fn sweep_expired(&mut self, now: i64) -> usize {
        let mut removed = 0;
        while let Some(item) = self.expiry.peek_min().copied() {
            if item.expire_at > now {
                break;
            }
            self.expiry.pop_min();
            // Stale when the entry was already evicted by priority.
            if self.delete_entry(item.id) {
                removed += 1;
            }
        }

        if removed > 0 {
            debug!("Expiry sweep: removed {} expired entries", removed);
        }
        removed
    }

    fn evict_lowest(&mut self) -> bool {
        let Some(id) = self.index.lowest() else {
            return false;
        };
        if let Some(entry) = self.arena.get(id) {
            debug!(
                "Evicting key '{}' (priority {}, recency {})",
                entry.key, entry.priority, entry.recency
            );
        }
        self.delete_entry(id)
    }

    /// Removes an entry from the arena and the index. The expiry structure
    /// keeps its now-stale id until it is popped or compacted away.
    ///
    /// Returns false if the entry was already gone.
    fn delete_entry(&mut self, id: EntryId) -> bool {
        match self.arena.remove(id) {
            Some(entry) => {
                self.index.remove(id, &entry);
                true
            }
            None => false,
        }
    }

    /// Drops stale ids once the expiry structure outgrows its slack.
    fn compact_expiry(&mut self) {
        let limit = self.expiry_limit();
        let before = self.expiry.len();
        if before <= limit {
            return;
        }

        let arena = &self.arena;
        self.expiry.retain(|item| arena.contains(item.id));
        debug!(
            "Compacted expiry structure from {} to {} items",
            before,
            self.expiry.len()
        );
    }

    fn is_expired(&self, id: EntryId, now: i64) -> bool {
        self.arena.get(id).map_or(true, |entry| entry.is_expired(now))
    }
}

// == Key Validation ==
fn validate_key(key: &str) -> Result<String> {
    let key = key.trim();
    if key.is_empty() {
        warn!("Rejected empty key");
        return Err(CacheError::InvalidKey("key is empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        warn!("Rejected key of {} bytes", key.len());
        return Err(CacheError::InvalidKey(format!(
            "key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(key.to_string())
}
