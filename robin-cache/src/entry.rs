//! Entry arena.
//!
//! A single owned `Entry<V>` per live binding, stored in a dense `Vec` and
//! referenced everywhere else only by slot index (`EntryId`). The index
//! and the recency list each hold a non-owning `EntryId`; the cache is the
//! sole owner of every entry.

use std::sync::Arc;
use std::time::Instant;

/// Index into the entry arena. Never reused while the entry it names is
/// still live; recycled only after the slot is freed.
pub(crate) type EntryId = usize;

/// One cached binding: key, value, expiry, and recency-list linkage.
///
/// `value` is stored behind an `Arc` so that handing a copy to a caller
/// from [`crate::cache::Cache::get`] never requires `V: Clone` — cloning
/// the `Arc` only bumps a refcount, whatever `V` is.
///
/// `probe_distance` is not stored here; it belongs to the index slot the
/// key currently occupies, not to the entry itself.
pub(crate) struct Entry<V> {
    pub key: Box<[u8]>,
    pub value: Arc<V>,
    pub expires_at: Option<Instant>,
    pub prev: Option<EntryId>,
    pub next: Option<EntryId>,
}

impl<V> Entry<V> {
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }
}

/// Dense slot storage for entries, with a free list for recycling.
pub(crate) struct Arena<V> {
    slots: Vec<Option<Entry<V>>>,
    free: Vec<EntryId>,
}

impl<V> Arena<V> {
    pub fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Inserts `entry` into a free or fresh slot and returns its id.
    pub fn insert(&mut self, entry: Entry<V>) -> EntryId {
        if let Some(id) = self.free.pop() {
            self.slots[id] = Some(entry);
            id
        } else {
            self.slots.push(Some(entry));
            self.slots.len() - 1
        }
    }

    pub fn get(&self, id: EntryId) -> &Entry<V> {
        self.slots[id].as_ref().expect("entry id is live")
    }

    pub fn get_mut(&mut self, id: EntryId) -> &mut Entry<V> {
        self.slots[id].as_mut().expect("entry id is live")
    }

    /// Removes and returns the entry at `id`, recycling the slot.
    pub fn remove(&mut self, id: EntryId) -> Entry<V> {
        let entry = self.slots[id].take().expect("entry id is live");
        self.free.push(id);
        entry
    }
}
