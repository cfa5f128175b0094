//! Entry Arena Module
//!
//! Slab of cache entries addressed by generational [`EntryId`]s.

use crate::cache::{CacheEntry, EntryId};

struct Slot<V> {
    generation: u32,
    entry: Option<CacheEntry<V>>,
}

// == Entry Arena ==
/// Owns every live entry. Both the expiry structure and the priority index
/// refer to entries by id only.
///
/// Removing an entry bumps its slot generation, so ids still held elsewhere
/// go stale and [`EntryArena::get`] returns `None` for them.
pub struct EntryArena<V> {
    slots: Vec<Slot<V>>,
    free: Vec<usize>,
    len: usize,
}

impl<V> EntryArena<V> {
    // == Constructor ==
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    // == Insert ==
    /// Stores an entry, reusing a free slot when one exists.
    pub fn insert(&mut self, entry: CacheEntry<V>) -> EntryId {
        self.len += 1;
        if let Some(slot) = self.free.pop() {
            let cell = &mut self.slots[slot];
            cell.entry = Some(entry);
            return EntryId {
                slot,
                generation: cell.generation,
            };
        }

        let slot = self.slots.len();
        self.slots.push(Slot {
            generation: 0,
            entry: Some(entry),
        });
        EntryId {
            slot,
            generation: 0,
        }
    }

    // == Get ==
    /// Resolves an id, or `None` if the entry was already removed.
    pub fn get(&self, id: EntryId) -> Option<&CacheEntry<V>> {
        self.slots
            .get(id.slot)
            .filter(|cell| cell.generation == id.generation)
            .and_then(|cell| cell.entry.as_ref())
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut CacheEntry<V>> {
        self.slots
            .get_mut(id.slot)
            .filter(|cell| cell.generation == id.generation)
            .and_then(|cell| cell.entry.as_mut())
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.get(id).is_some()
    }

    // == Remove ==
    /// Takes an entry out and retires its id. Removing a stale id is a no-op.
    pub fn remove(&mut self, id: EntryId) -> Option<CacheEntry<V>> {
        let cell = self.slots.get_mut(id.slot)?;
        if cell.generation != id.generation {
            return None;
        }
        let entry = cell.entry.take()?;
        cell.generation = cell.generation.wrapping_add(1);
        self.free.push(id.slot);
        self.len -= 1;
        Some(entry)
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates over live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &CacheEntry<V>)> {
        self.slots.iter().enumerate().filter_map(|(slot, cell)| {
            cell.entry.as_ref().map(|entry| {
                (
                    EntryId {
                        slot,
                        generation: cell.generation,
                    },
                    entry,
                )
            })
        })
    }
}

impl<V> Default for EntryArena<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for EntryArena<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryArena")
            .field("len", &self.len)
            .field("slots", &self.slots.len())
            .field("free", &self.free.len())
            .finish()
    }
}
