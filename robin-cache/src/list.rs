//! Recency list: a doubly linked list of entries ordered most-recently-used
//! first, threaded through the entry arena's own `prev`/`next` fields so no
//! separate node allocation is needed.
//!
//! All operations are O(1) and assume the caller already holds the cache's
//! exclusive lock; the list has no internal synchronization of its own.

use crate::entry::{Arena, EntryId};

/// Head (MRU) / tail (LRU) pointers into the shared entry arena.
pub(crate) struct RecencyList {
    head: Option<EntryId>,
    tail: Option<EntryId>,
}

impl RecencyList {
    pub fn new() -> Self {
        RecencyList {
            head: None,
            tail: None,
        }
    }

    pub fn head(&self) -> Option<EntryId> {
        self.head
    }

    /// Links `id` in as the new head (most recently used).
    pub fn push_front<V>(&mut self, arena: &mut Arena<V>, id: EntryId) {
        let old_head = self.head;
        {
            let node = arena.get_mut(id);
            node.prev = None;
            node.next = old_head;
        }
        if let Some(old_head_id) = old_head {
            arena.get_mut(old_head_id).prev = Some(id);
        } else {
            self.tail = Some(id);
        }
        self.head = Some(id);
    }

    /// Detaches `id` from the list, leaving its own links stale until the
    /// caller either re-links it (`push_front`) or discards the entry.
    pub fn unlink<V>(&mut self, arena: &mut Arena<V>, id: EntryId) {
        let (prev, next) = {
            let node = arena.get(id);
            (node.prev, node.next)
        };

        match prev {
            Some(prev_id) => arena.get_mut(prev_id).next = next,
            None => self.head = next,
        }
        match next {
            Some(next_id) => arena.get_mut(next_id).prev = prev,
            None => self.tail = prev,
        }
    }

    /// Moves `id` to the head. No-op if it is already there (so a
    /// single-entry list is never needlessly relinked).
    pub fn move_to_front<V>(&mut self, arena: &mut Arena<V>, id: EntryId) {
        if self.head == Some(id) {
            return;
        }
        self.unlink(arena, id);
        self.push_front(arena, id);
    }

    /// Detaches and returns the least-recently-used entry's id, if any.
    pub fn pop_back<V>(&mut self, arena: &mut Arena<V>) -> Option<EntryId> {
        let id = self.tail?;
        self.unlink(arena, id);
        Some(id)
    }
}
