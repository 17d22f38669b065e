//! Bounded message cache.
//!
//! Keyed by `(marked chat id, message id)`.  The decoder writes every
//! decoded message except polls and reads entries back to resolve reply
//! links without a round trip.  The cache is an optimization, not a
//! correctness dependency: writes are last-writer-wins and a concurrent
//! decode of the same id is acceptable.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::message::Message;

/// Composite cache key: `(marked chat id, message id)`.
pub type MessageKey = (i64, i32);

/// A bounded associative message store with insertion-order eviction.
pub struct MessageCache {
    capacity: usize,
    inner:    Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    map:   HashMap<MessageKey, Message>,
    order: VecDeque<MessageKey>,
}

impl MessageCache {
    /// A cache holding at most `capacity` messages. A zero capacity
    /// disables storage entirely.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Look a message up by key.
    pub fn get(&self, key: &MessageKey) -> Option<Message> {
        self.inner.lock().expect("message cache poisoned").map.get(key).cloned()
    }

    /// Insert a message, evicting the oldest entry at capacity.
    ///
    /// Overwriting an existing key keeps its position in the eviction order.
    pub fn insert(&self, key: MessageKey, message: Message) {
        if self.capacity == 0 {
            return;
        }
        let mut inner = self.inner.lock().expect("message cache poisoned");
        if inner.map.contains_key(&key) {
            inner.map.insert(key, message);
            return;
        }
        if inner.map.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.map.remove(&oldest);
            }
        }
        inner.order.push_back(key);
        inner.map.insert(key, message);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("message cache poisoned").map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(id: i32) -> Message {
        Message { id, ..Message::default() }
    }

    #[test]
    fn get_returns_inserted_message() {
        let cache = MessageCache::new(4);
        cache.insert((-1, 10), probe(10));
        assert_eq!(cache.get(&(-1, 10)).unwrap().id, 10);
        assert_eq!(cache.get(&(-1, 11)), None);
    }

    #[test]
    fn oldest_entry_is_evicted_at_capacity() {
        let cache = MessageCache::new(2);
        cache.insert((0, 1), probe(1));
        cache.insert((0, 2), probe(2));
        cache.insert((0, 3), probe(3));
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&(0, 1)).is_none());
        assert!(cache.get(&(0, 2)).is_some());
        assert!(cache.get(&(0, 3)).is_some());
    }

    #[test]
    fn overwrite_does_not_evict() {
        let cache = MessageCache::new(2);
        cache.insert((0, 1), probe(1));
        cache.insert((0, 2), probe(2));
        cache.insert((0, 1), probe(100));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&(0, 1)).unwrap().id, 100);
        assert!(cache.get(&(0, 2)).is_some());
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let cache = MessageCache::new(0);
        cache.insert((0, 1), probe(1));
        assert!(cache.is_empty());
    }
}
