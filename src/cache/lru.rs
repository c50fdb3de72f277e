//! LRU List Module
//!
//! Recency ordering for cache eviction, kept as an intrusive doubly-linked
//! list inside an index-stable arena. Nodes are addressed by integer handles
//! that stay valid until the node is removed.

// == Handle ==
/// Stable index of a node inside an [`LruList`].
pub type Handle = usize;

#[derive(Debug)]
struct Node<T> {
    value: T,
    /// More recently used neighbour
    prev: Option<Handle>,
    /// Less recently used neighbour
    next: Option<Handle>,
}

// == LRU List ==
/// Tracks access order for LRU eviction.
///
/// - Head = most recently used
/// - Tail = least recently used
///
/// Freed slots are recycled, so handles are only meaningful while the node
/// they were returned for is still linked.
#[derive(Debug)]
pub struct LruList<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<Handle>,
    head: Option<Handle>,
    tail: Option<Handle>,
    len: usize,
}

impl<T> Default for LruList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LruList<T> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts `value` as the most recently used node and returns its handle.
    pub fn push_front(&mut self, value: T) -> Handle {
        let node = Node {
            value,
            prev: None,
            next: None,
        };
        let handle = match self.free.pop() {
            Some(handle) => {
                self.slots[handle] = Some(node);
                handle
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.link_front(handle);
        self.len += 1;
        handle
    }

    // == Touch ==
    /// Marks a node as recently used (moves it to the head).
    ///
    /// Unknown handles are ignored.
    pub fn touch(&mut self, handle: Handle) {
        if self.head == Some(handle) || self.node(handle).is_none() {
            return;
        }
        self.unlink(handle);
        self.link_front(handle);
    }

    // == Remove ==
    /// Unlinks a node and returns its value.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        self.node(handle)?;
        self.unlink(handle);
        let node = self.slots[handle].take()?;
        self.free.push(handle);
        self.len -= 1;
        Some(node.value)
    }

    // == Evict Oldest ==
    /// Removes and returns the least recently used value.
    ///
    /// Returns None if the list is empty.
    pub fn evict_oldest(&mut self) -> Option<T> {
        let tail = self.tail?;
        self.remove(tail)
    }

    // == Peek Oldest ==
    /// Returns the least recently used value without removing it.
    pub fn peek_oldest(&self) -> Option<&T> {
        self.tail.and_then(|h| self.get(h))
    }

    /// Borrow the value behind a handle.
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.node(handle).map(|node| &node.value)
    }

    // == Length ==
    /// Returns the number of linked nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates values from most to least recently used.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    fn node(&self, handle: Handle) -> Option<&Node<T>> {
        self.slots.get(handle).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, handle: Handle) -> Option<&mut Node<T>> {
        self.slots.get_mut(handle).and_then(Option::as_mut)
    }

    fn unlink(&mut self, handle: Handle) {
        let (prev, next) = match self.node(handle) {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev.and_then(|p| self.node_mut(p)) {
            Some(node) => node.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.node_mut(n)) {
            Some(node) => node.prev = prev,
            None => self.tail = prev,
        }
    }

    fn link_front(&mut self, handle: Handle) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(handle) {
            node.prev = None;
            node.next = old_head;
        }
        match old_head.and_then(|h| self.node_mut(h)) {
            Some(node) => node.prev = Some(handle),
            None => self.tail = Some(handle),
        }
        self.head = Some(handle);
    }
}

// == Iterator ==
/// Front-to-back iterator over an [`LruList`].
pub struct Iter<'a, T> {
    list: &'a LruList<T>,
    cursor: Option<Handle>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let list = self.list;
        let node = list.node(self.cursor?)?;
        self.cursor = node.next;
        Some(&node.value)
    }
}
