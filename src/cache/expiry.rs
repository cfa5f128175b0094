//! Expiry Queue Module
//!
//! Min-heap keeping the next deadline at the top, plus the trait the cache
//! uses to plug in an expiry-ordered structure.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

// == Load Factor ==
/// Slack multiplier over nominal capacity for the expiry structure.
///
/// Entries evicted by priority stay behind in the expiry structure as stale
/// ids until they reach the top. The cache compacts the structure once it
/// holds more than `LOAD_FACTOR * max(max_items, 1)` items.
pub const LOAD_FACTOR: usize = 2;

// == Expiry Structure ==
/// An ordered container the eviction engine pops expired items from.
pub trait ExpiryStructure<T> {
    /// Adds an item.
    fn push(&mut self, item: T);

    /// Returns the next item to expire without removing it.
    fn peek_min(&mut self) -> Option<&T>;

    /// Removes and returns the next item to expire.
    fn pop_min(&mut self) -> Option<T>;

    /// Number of items held, stale ones included.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keeps only the items for which `keep` returns true.
    fn retain<F: FnMut(&T) -> bool>(&mut self, keep: F);
}

// == Expiry Queue ==
/// Binary min-heap over a dense array.
#[derive(Debug, Clone)]
pub struct ExpiryQueue<T: Ord> {
    heap: BinaryHeap<Reverse<T>>,
}

impl<T: Ord> ExpiryQueue<T> {
    // == Constructor ==
    /// Creates a queue with room for `max_items * LOAD_FACTOR` items.
    ///
    /// The queue still grows past that if needed.
    pub fn with_capacity(max_items: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(max_items.saturating_mul(LOAD_FACTOR)),
        }
    }

    // == Peek ==
    pub fn peek(&self) -> Option<&T> {
        self.heap.peek().map(|Reverse(item)| item)
    }

    // == Push ==
    pub fn push(&mut self, item: T) {
        self.heap.push(Reverse(item));
    }

    // == Pop ==
    pub fn pop(&mut self) -> Option<T> {
        self.heap.pop().map(|Reverse(item)| item)
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T: Ord> Default for ExpiryQueue<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<T: Ord> ExpiryStructure<T> for ExpiryQueue<T> {
    fn push(&mut self, item: T) {
        ExpiryQueue::push(self, item);
    }

    fn peek_min(&mut self) -> Option<&T> {
        self.peek()
    }

    fn pop_min(&mut self) -> Option<T> {
        self.pop()
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn retain<F: FnMut(&T) -> bool>(&mut self, mut keep: F) {
        self.heap.retain(|Reverse(item)| keep(item));
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_pops_in_expiry_order() {
        let mut queue = ExpiryQueue::with_capacity(6);
        queue.push((1, "a"));
        queue.push((2, "b"));
        queue.push((6, "c"));
        queue.push((3, "d"));
        queue.push((4, "e"));

        assert_eq!(queue.len(), 5);
        assert_eq!(queue.peek(), Some(&(1, "a")));
        assert_eq!(queue.pop(), Some((1, "a")));
        assert_eq!(queue.pop(), Some((2, "b")));
        assert_eq!(queue.pop(), Some((3, "d")));
        assert_eq!(queue.pop(), Some((4, "e")));
        assert_eq!(queue.pop(), Some((6, "c")));
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_peek_does_not_remove() {
        let mut queue = ExpiryQueue::with_capacity(1);
        queue.push(5);

        assert_eq!(queue.peek(), Some(&5));
        assert_eq!(queue.peek(), Some(&5));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_queue_grows_past_nominal_capacity() {
        let mut queue = ExpiryQueue::with_capacity(2);
        for deadline in (0..10).rev() {
            queue.push(deadline);
        }

        assert_eq!(queue.len(), 10);
        assert_eq!(queue.pop(), Some(0));
    }

    #[test]
    fn test_queue_retain_keeps_heap_order() {
        let mut queue = ExpiryQueue::with_capacity(4);
        for deadline in [8, 3, 5, 1, 9, 2] {
            ExpiryStructure::push(&mut queue, deadline);
        }

        queue.retain(|deadline| deadline % 2 == 1);

        assert_eq!(ExpiryStructure::len(&queue), 4);
        assert_eq!(queue.pop_min(), Some(1));
        assert_eq!(queue.pop_min(), Some(3));
        assert_eq!(queue.peek_min(), Some(&5));
    }
}
