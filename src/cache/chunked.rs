//! Chunked Expiry List Module
//!
//! Block-structured list tuned for entries appended in roughly
//! non-decreasing expiry order, such as a workload with uniform TTLs.

use std::collections::VecDeque;

use crate::cache::ExpiryStructure;

/// Default number of items per block.
pub const DEFAULT_BLOCK_SIZE: usize = 1024;

// == Block ==
/// A fixed-size run of items, sorted lazily on first read after a write.
#[derive(Debug, Clone)]
struct Block<T> {
    items: VecDeque<T>,
    /// Items already deleted from the front (low-water mark)
    consumed: usize,
    sorted: bool,
}

impl<T: Ord> Block<T> {
    fn new(block_size: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(block_size),
            consumed: 0,
            sorted: true,
        }
    }

    /// Slots used so far, consumed ones included.
    fn filled(&self) -> usize {
        self.items.len() + self.consumed
    }

    fn live(&self) -> usize {
        self.items.len()
    }

    fn append(&mut self, item: T) {
        self.items.push_back(item);
        self.sorted = false;
    }

    fn ensure_sorted(&mut self) {
        if !self.sorted {
            self.items.make_contiguous().sort_unstable();
            self.sorted = true;
        }
    }

    fn get(&mut self, offset: usize) -> Option<&T> {
        self.ensure_sorted();
        self.items.get(offset)
    }

    fn delete_min(&mut self) -> Option<T> {
        self.ensure_sorted();
        let item = self.items.pop_front()?;
        self.consumed += 1;
        Some(item)
    }
}

// == Chunked Expiry List ==
/// Ordered list made of fixed-size blocks.
///
/// Appends go to the tail block. [`delete`](Self::delete) takes the minimum
/// of the head block, which is the global minimum only when items arrive in
/// non-decreasing order across blocks. [`delete_earliest`](Self::delete_earliest)
/// compares every block's minimum and is what the cache sweeps with.
#[derive(Debug, Clone)]
pub struct ChunkedExpiryList<T> {
    blocks: Vec<Block<T>>,
    size: usize,
    block_size: usize,
}

impl<T: Ord> ChunkedExpiryList<T> {
    // == Constructor ==
    /// Creates an empty list. A `block_size` of zero is treated as one.
    pub fn new(block_size: usize) -> Self {
        let block_size = block_size.max(1);
        Self {
            blocks: vec![Block::new(block_size)],
            size: 0,
            block_size,
        }
    }

    // == Append ==
    /// Adds an item to the tail block, opening a new block when it is full.
    pub fn append(&mut self, item: T) {
        let tail_full = self
            .blocks
            .last()
            .map_or(true, |block| block.filled() >= self.block_size);
        if tail_full {
            self.blocks.push(Block::new(self.block_size));
        }
        if let Some(tail) = self.blocks.last_mut() {
            tail.append(item);
            self.size += 1;
        }
    }

    // == Get ==
    /// Returns the item at logical index `index`.
    ///
    /// Walks blocks from the head, so this is linear in the block count.
    pub fn get(&mut self, index: usize) -> Option<&T> {
        let (block, offset) = self.locate(index)?;
        self.blocks[block].get(offset)
    }

    // == Delete ==
    /// Removes the head block's minimum and retires the block once drained.
    pub fn delete(&mut self) -> Option<T> {
        let head = self.blocks.first_mut()?;
        let item = head.delete_min();
        if head.live() == 0 {
            self.retire_head();
        }
        if item.is_some() {
            self.size -= 1;
        }
        item
    }

    // == Earliest ==
    /// Returns the smallest item across all block heads.
    ///
    /// Sorts each dirty block once, then compares block minimums, so this is
    /// linear in the block count and exact whatever the append order.
    pub fn peek_earliest(&mut self) -> Option<&T> {
        let position = self.earliest_block()?;
        self.blocks[position].get(0)
    }

    /// Removes the smallest item across all block heads, advancing that
    /// block's low-water mark and retiring the block once drained.
    pub fn delete_earliest(&mut self) -> Option<T> {
        let position = self.earliest_block()?;
        let block = &mut self.blocks[position];
        let item = block.delete_min()?;
        if block.live() == 0 {
            self.retire_block(position);
        }
        self.size -= 1;
        Some(item)
    }

    // == Length ==
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of blocks currently held, the empty sole block included.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn locate(&self, index: usize) -> Option<(usize, usize)> {
        let mut remaining = index;
        for (position, block) in self.blocks.iter().enumerate() {
            if remaining < block.live() {
                return Some((position, remaining));
            }
            remaining -= block.live();
        }
        None
    }

    fn earliest_block(&mut self) -> Option<usize> {
        let mut earliest: Option<usize> = None;
        for position in 0..self.blocks.len() {
            self.blocks[position].ensure_sorted();
            let Some(candidate) = self.blocks[position].items.front() else {
                continue;
            };
            let better = earliest
                .and_then(|best| self.blocks[best].items.front())
                .map_or(true, |best| candidate < best);
            if better {
                earliest = Some(position);
            }
        }
        earliest
    }

    fn retire_head(&mut self) {
        self.retire_block(0);
    }

    /// Drops a drained block, or resets it when it is the only one.
    fn retire_block(&mut self, position: usize) {
        if self.blocks.len() > 1 {
            self.blocks.remove(position);
        } else {
            self.blocks[0] = Block::new(self.block_size);
        }
    }
}

impl<T: Ord> Default for ChunkedExpiryList<T> {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_SIZE)
    }
}

impl<T: Ord> ExpiryStructure<T> for ChunkedExpiryList<T> {
    fn push(&mut self, item: T) {
        self.append(item);
    }

    fn peek_min(&mut self) -> Option<&T> {
        self.peek_earliest()
    }

    fn pop_min(&mut self) -> Option<T> {
        self.delete_earliest()
    }

    fn len(&self) -> usize {
        self.size
    }

    fn retain<F: FnMut(&T) -> bool>(&mut self, mut keep: F) {
        for block in &mut self.blocks {
            block.items.retain(|item| keep(item));
        }
        // Drained blocks would stall `delete` on an empty head.
        let tail = self.blocks.len().saturating_sub(1);
        let mut position = 0;
        self.blocks.retain(|block| {
            let keep_block = block.live() > 0 || position == tail;
            position += 1;
            keep_block
        });
        self.size = self.blocks.iter().map(Block::live).sum();
    }
}
