//! LRU List Module
//!
//! Implements the recency ordering as an arena-backed doubly-linked list.

use chrono::{DateTime, Utc};

use crate::cache::Entry;

/// Handle of the head sentinel (most recently used side).
pub(crate) const HEAD: usize = 0;
/// Handle of the tail sentinel (least recently used side).
pub(crate) const TAIL: usize = 1;

// == LRU List ==
/// Recency-ordered list of cache entries.
///
/// Entries live in a `Vec` and link to each other by index, so there is no
/// shared ownership between nodes. Two permanent sentinels bound the list:
/// - `HEAD.next` = most recently used
/// - `TAIL.prev` = least recently used
///
/// Freed slots are recycled before the arena grows.
#[derive(Debug)]
pub struct LruList<K, V> {
    nodes: Vec<Entry<K, V>>,
    /// Handles of unoccupied slots
    free: Vec<usize>,
    len: usize,
}

impl<K, V> LruList<K, V> {
    // == Constructor ==
    /// Creates a list containing only the two linked sentinels.
    pub fn new() -> Self {
        Self {
            nodes: vec![Entry::sentinel(HEAD, TAIL), Entry::sentinel(HEAD, TAIL)],
            free: Vec::new(),
            len: 0,
        }
    }

    // == Push Front ==
    /// Stores a new mapping and links it as the most recently used entry.
    ///
    /// Returns the handle of the new entry.
    pub fn push_front(&mut self, key: K, value: V, expires_at: Option<DateTime<Utc>>) -> usize {
        let entry = Entry::new(key, value, expires_at);
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = entry;
                idx
            }
            None => {
                self.nodes.push(entry);
                self.nodes.len() - 1
            }
        };

        self.link_front(idx);
        self.len += 1;
        idx
    }

    // == Touch ==
    /// Moves a linked entry to the most recently used position.
    pub fn move_to_front(&mut self, idx: usize) {
        if !self.is_linked(idx) || self.nodes[HEAD].next == idx {
            return;
        }
        self.unlink(idx);
        self.link_front(idx);
    }

    // == Remove ==
    /// Unlinks an entry and returns its mapping. The slot goes back to the
    /// free list.
    ///
    /// Returns None if the handle does not refer to a linked entry.
    pub fn remove(&mut self, idx: usize) -> Option<(K, V)> {
        if !self.is_linked(idx) {
            return None;
        }
        self.unlink(idx);
        self.len -= 1;
        self.free.push(idx);
        self.nodes[idx].take()
    }

    // == Back ==
    /// Returns the handle of the least recently used entry.
    pub fn back(&self) -> Option<usize> {
        let idx = self.nodes[TAIL].prev;
        (idx != HEAD).then_some(idx)
    }

    // == Front ==
    /// Returns the handle of the most recently used entry.
    pub fn front(&self) -> Option<usize> {
        let idx = self.nodes[HEAD].next;
        (idx != TAIL).then_some(idx)
    }

    pub fn entry(&self, idx: usize) -> Option<&Entry<K, V>> {
        self.nodes.get(idx).filter(|entry| entry.is_occupied())
    }

    pub fn entry_mut(&mut self, idx: usize) -> Option<&mut Entry<K, V>> {
        self.nodes.get_mut(idx).filter(|entry| entry.is_occupied())
    }

    // == Iter ==
    /// Iterates `(handle, entry)` pairs from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            cursor: self.nodes[HEAD].next,
            remaining: self.len,
        }
    }

    // == Clear ==
    /// Drops every entry and relinks the sentinels to each other.
    pub fn clear(&mut self) {
        self.nodes.truncate(2);
        self.nodes[HEAD].next = TAIL;
        self.nodes[TAIL].prev = HEAD;
        self.free.clear();
        self.len = 0;
    }

    // == Length ==
    /// Returns the number of linked entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn is_linked(&self, idx: usize) -> bool {
        idx > TAIL && self.nodes.get(idx).is_some_and(Entry::is_occupied)
    }

    /// Splices a detached slot in right after the head sentinel.
    fn link_front(&mut self, idx: usize) {
        let first = self.nodes[HEAD].next;
        self.nodes[idx].prev = HEAD;
        self.nodes[idx].next = first;
        self.nodes[HEAD].next = idx;
        self.nodes[first].prev = idx;
    }

    /// Detaches a slot from its neighbours. The slot links to itself afterwards.
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
        self.nodes[idx].prev = idx;
        self.nodes[idx].next = idx;
    }
}

impl<K, V> Default for LruList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// == Iterator ==
/// Recency-order iterator over an [`LruList`].
#[derive(Debug)]
pub struct Iter<'a, K, V> {
    list: &'a LruList<K, V>,
    cursor: usize,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (usize, &'a Entry<K, V>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == TAIL {
            return None;
        }
        let idx = self.cursor;
        let entry = &self.list.nodes[idx];
        self.cursor = entry.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((idx, entry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

#[cfg(test)]
impl<K, V> LruList<K, V> {
    /// Total number of arena slots, sentinels included.
    pub(crate) fn slots(&self) -> usize {
        self.nodes.len()
    }

    /// Walks the list in both directions and panics on any broken link.
    pub(crate) fn assert_consistent(&self) {
        let mut forward = 0;
        let mut cur = HEAD;
        while self.nodes[cur].next != TAIL {
            let next = self.nodes[cur].next;
            assert_eq!(self.nodes[next].prev, cur, "broken back link at {next}");
            assert!(self.nodes[next].is_occupied(), "unoccupied slot {next} is linked");
            forward += 1;
            assert!(forward <= self.len, "cycle in forward traversal");
            cur = next;
        }
        assert_eq!(self.nodes[TAIL].prev, cur, "tail sentinel out of sync");
        assert_eq!(forward, self.len, "forward traversal length");

        let mut backward = 0;
        let mut cur = TAIL;
        while self.nodes[cur].prev != HEAD {
            cur = self.nodes[cur].prev;
            backward += 1;
            assert!(backward <= self.len, "cycle in backward traversal");
        }
        assert_eq!(backward, self.len, "backward traversal length");

        for &idx in &self.free {
            assert!(!self.nodes[idx].is_occupied(), "free slot {idx} is occupied");
        }
        assert_eq!(self.nodes.len(), 2 + self.len + self.free.len());
    }
}
