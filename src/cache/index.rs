//! Priority Index Module
//!
//! Maps each key to its live entries and keeps a global eviction order.

use std::collections::{BTreeSet, HashMap};

use crate::cache::{priority_order, CacheEntry, EntryArena, EntryId};

/// Position in the global eviction order: lowest priority first, then least
/// recently used.
type Rung = (u8, u64, EntryId);

// == Priority Index ==
/// Per-key entry sequences plus the eviction ladder.
///
/// Each key's sequence is sorted by descending priority and, within a
/// priority, newest first, so the head answers lookups. The ladder orders
/// every live entry by `(priority, recency)` so the next victim is found in
/// `O(log n)` instead of scanning every key.
#[derive(Debug, Default)]
pub struct PriorityIndex {
    by_key: HashMap<String, Vec<EntryId>>,
    ladder: BTreeSet<Rung>,
}

impl PriorityIndex {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Insert ==
    /// Adds an entry already stored in `arena` under `id`.
    pub fn insert<V>(&mut self, arena: &EntryArena<V>, id: EntryId) {
        let Some(entry) = arena.get(id) else {
            return;
        };

        let sequence = self.by_key.entry(entry.key.clone()).or_default();
        let position = sequence.partition_point(|other| {
            let other = arena.get(*other);
            priority_order(other, Some(entry))
                .then_with(|| {
                    let other_seq = other.map_or(0, |o| o.seq);
                    entry.seq.cmp(&other_seq)
                })
                .is_lt()
        });
        sequence.insert(position, id);

        self.ladder.insert((entry.priority, entry.recency, id));
    }

    // == Remove ==
    /// Unlinks `entry`, which was stored under `id`. Dropping the last entry
    /// of a key drops the key.
    ///
    /// Returns false if the entry was not indexed.
    pub fn remove<V>(&mut self, id: EntryId, entry: &CacheEntry<V>) -> bool {
        let Some(sequence) = self.by_key.get_mut(&entry.key) else {
            return false;
        };
        let Some(position) = sequence.iter().position(|other| *other == id) else {
            return false;
        };

        sequence.remove(position);
        if sequence.is_empty() {
            self.by_key.remove(&entry.key);
        }
        self.ladder.remove(&(entry.priority, entry.recency, id));
        true
    }

    // == Touch ==
    /// Moves an entry up the ladder after its recency changed.
    pub fn touch(&mut self, id: EntryId, priority: u8, old_recency: u64, new_recency: u64) {
        if self.ladder.remove(&(priority, old_recency, id)) {
            self.ladder.insert((priority, new_recency, id));
        }
    }

    // == Lookups ==
    /// The entry answering reads for `key`.
    pub fn head(&self, key: &str) -> Option<EntryId> {
        self.by_key.get(key).and_then(|sequence| sequence.first().copied())
    }

    /// The next eviction victim: lowest priority, then least recently used.
    pub fn lowest(&self) -> Option<EntryId> {
        self.ladder.first().map(|&(_, _, id)| id)
    }

    /// Entries currently stored under `key`, highest priority first.
    pub fn entries(&self, key: &str) -> &[EntryId] {
        self.by_key.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    // == Keys ==
    /// Distinct keys in lexicographic order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.by_key.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of indexed entries across all keys.
    pub fn len(&self) -> usize {
        self.ladder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ladder.is_empty()
    }
}
