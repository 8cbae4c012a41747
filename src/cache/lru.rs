//! LRU List Module
//!
//! Recency order for cache eviction, stored as an arena of nodes.
//!
//! Nodes live in a `Vec` and link to each other by index, so every
//! operation except [`LruList::retain`] is O(1). Freed slots are reused.

use crate::cache::CacheEntry;

// == Node ==
#[derive(Debug)]
struct Node<K, V> {
    key: K,
    entry: CacheEntry<V>,
    /// Neighbour towards the most recently used end
    prev: Option<usize>,
    /// Neighbour towards the least recently used end
    next: Option<usize>,
}

// == LRU List ==
/// Doubly-linked recency list over an index arena.
///
/// - Head = Most recently used
/// - Tail = Least recently used
#[derive(Debug)]
pub struct LruList<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<K, V> Default for LruList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> LruList<K, V> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts a node as most recently used and returns its slot index.
    pub fn push_front(&mut self, key: K, entry: CacheEntry<V>) -> usize {
        let node = Node {
            key,
            entry,
            prev: None,
            next: self.head,
        };

        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        if let Some(old_head) = self.head {
            if let Some(n) = self.node_mut(old_head) {
                n.prev = Some(idx);
            }
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
        self.len += 1;
        idx
    }

    // == Touch ==
    /// Marks a slot as most recently used.
    pub fn touch(&mut self, idx: usize) {
        if self.head == Some(idx) || self.unlink(idx).is_none() {
            return;
        }

        let old_head = self.head;
        if let Some(n) = self.node_mut(idx) {
            n.prev = None;
            n.next = old_head;
        }
        if let Some(h) = old_head {
            if let Some(n) = self.node_mut(h) {
                n.prev = Some(idx);
            }
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    // == Remove ==
    /// Removes a slot, returning its key and entry.
    pub fn remove(&mut self, idx: usize) -> Option<(K, CacheEntry<V>)> {
        self.unlink(idx)?;
        let node = self.slots.get_mut(idx)?.take()?;
        self.free.push(idx);
        self.len -= 1;
        Some((node.key, node.entry))
    }

    // == Pop Back ==
    /// Removes and returns the least recently used node.
    pub fn pop_back(&mut self) -> Option<(K, CacheEntry<V>)> {
        let tail = self.tail?;
        self.remove(tail)
    }

    /// Returns the least recently used key without removing it.
    pub fn peek_back(&self) -> Option<&K> {
        self.tail.and_then(|idx| self.node(idx)).map(|n| &n.key)
    }

    // == Entry Access ==
    pub fn entry(&self, idx: usize) -> Option<&CacheEntry<V>> {
        self.node(idx).map(|n| &n.entry)
    }

    pub fn entry_mut(&mut self, idx: usize) -> Option<&mut CacheEntry<V>> {
        self.node_mut(idx).map(|n| &mut n.entry)
    }

    // == Retain ==
    /// Removes every node for which `keep` returns false.
    ///
    /// Returns the removed keys so callers can drop their index entries.
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<K>
    where
        F: FnMut(&K, &CacheEntry<V>) -> bool,
    {
        let doomed: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| match slot {
                Some(n) if !keep(&n.key, &n.entry) => Some(idx),
                _ => None,
            })
            .collect();

        doomed
            .into_iter()
            .filter_map(|idx| self.remove(idx).map(|(key, _)| key))
            .collect()
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    // == Iteration ==
    /// Iterates from least to most recently used.
    pub fn iter_lru(&self) -> impl Iterator<Item = (&K, &CacheEntry<V>)> + '_ {
        let mut cursor = self.tail;
        std::iter::from_fn(move || {
            let node = self.node(cursor?)?;
            cursor = node.prev;
            Some((&node.key, &node.entry))
        })
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn node(&self, idx: usize) -> Option<&Node<K, V>> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node<K, V>> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    /// Detaches a node from its neighbours, leaving it in its slot.
    fn unlink(&mut self, idx: usize) -> Option<()> {
        let (prev, next) = {
            let n = self.node(idx)?;
            (n.prev, n.next)
        };

        match prev {
            Some(p) => {
                if let Some(n) = self.node_mut(p) {
                    n.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(nx) => {
                if let Some(n) = self.node_mut(nx) {
                    n.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(n) = self.node_mut(idx) {
            n.prev = None;
            n.next = None;
        }
        Some(())
    }
}
