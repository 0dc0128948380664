//! Open-addressed Robin Hood index.
//!
//! Maps a key to the `EntryId` of the arena slot holding its binding.
//! Entries themselves live in [`crate::entry::Arena`]; the index never
//! owns one, only the `EntryId` and its own copy of the key.
//!
//! Growth and the Robin Hood swap rule: capacity doubles (starting at
//! [`INITIAL_CAPACITY`]) whenever occupancy would exceed
//! [`LOAD_FACTOR_THRESHOLD`], probing is capped at [`MAX_PROBE_DEPTH`]
//! slots, and an insertion that encounters a resident with a smaller
//! probe distance steals its slot and keeps probing with the displaced
//! entry ("rob from the rich").

use robin_cache_common::{CacheError, CacheResult, INITIAL_CAPACITY, LOAD_FACTOR_THRESHOLD, MAX_PROBE_DEPTH};

use crate::entry::EntryId;
use crate::hash::djb2;

enum Slot {
    Empty,
    Occupied {
        key: Box<[u8]>,
        entry_id: EntryId,
        probe_distance: u32,
    },
}

/// Outcome of [`Index::upsert`]: whether the key was new or replaced one
/// already present (in which case the caller must release the old entry).
pub(crate) enum UpsertOutcome {
    Inserted,
    Replaced { old_entry_id: EntryId },
}

pub(crate) struct Index {
    slots: Vec<Slot>,
    mask: usize,
    size: usize,
}

impl Index {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.next_power_of_two().max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || Slot::Empty);
        Index {
            slots,
            mask: capacity - 1,
            size: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn ideal_slot(&self, key: &[u8]) -> usize {
        (djb2(key) as usize) & self.mask
    }

    fn over_load_factor(&self) -> bool {
        (self.size as f64 / self.slots.len() as f64) > LOAD_FACTOR_THRESHOLD
    }

    /// Looks up `key`. Stops at the first empty slot (Robin Hood ordering
    /// guarantees no later slot can hold this key once an empty one is
    /// seen) or after `MAX_PROBE_DEPTH` slots, whichever comes first.
    pub fn lookup(&self, key: &[u8]) -> Option<EntryId> {
        let mut pos = self.ideal_slot(key);
        for _ in 0..MAX_PROBE_DEPTH {
            match &self.slots[pos] {
                Slot::Empty => return None,
                Slot::Occupied { key: k, entry_id, .. } if k.as_ref() == key => {
                    return Some(*entry_id);
                }
                Slot::Occupied { .. } => {}
            }
            pos = (pos + 1) & self.mask;
        }
        None
    }

    /// Inserts or replaces `key`'s binding, growing the table first if the
    /// load factor would be exceeded, and again (resize-and-retry) if the
    /// probe window is exhausted mid-insert. The source silently drops an
    /// insert on probe overflow; this treats that as a defect and never
    /// surfaces a silent data loss to the caller.
    pub fn upsert(&mut self, key: &[u8], entry_id: EntryId) -> CacheResult<UpsertOutcome> {
        if self.over_load_factor() {
            self.grow()?;
        }

        match self.try_insert(key, entry_id) {
            Some(outcome) => Ok(outcome),
            None => {
                // Pathological clustering even under the load-factor bound;
                // resize once more and retry. A second failure means the
                // resize policy itself cannot make room, which is a bug
                // rather than a recoverable condition.
                self.grow()?;
                self.try_insert(key, entry_id).ok_or(CacheError::ProbeOverflow)
            }
        }
    }

    fn try_insert(&mut self, key: &[u8], entry_id: EntryId) -> Option<UpsertOutcome> {
        let mut carry_key: Box<[u8]> = key.into();
        let mut carry_entry_id = entry_id;
        let mut pos = self.ideal_slot(key);
        let mut dist: u32 = 0;

        loop {
            if dist as usize >= MAX_PROBE_DEPTH {
                return None;
            }

            match &mut self.slots[pos] {
                Slot::Empty => {
                    self.slots[pos] = Slot::Occupied {
                        key: carry_key,
                        entry_id: carry_entry_id,
                        probe_distance: dist,
                    };
                    self.size += 1;
                    return Some(UpsertOutcome::Inserted);
                }
                Slot::Occupied {
                    key: resident_key,
                    entry_id: resident_entry_id,
                    ..
                } if resident_key.as_ref() == carry_key.as_ref() => {
                    let old_entry_id = *resident_entry_id;
                    *resident_entry_id = carry_entry_id;
                    return Some(UpsertOutcome::Replaced { old_entry_id });
                }
                Slot::Occupied {
                    key: resident_key,
                    entry_id: resident_entry_id,
                    probe_distance: resident_dist,
                } if *resident_dist < dist => {
                    std::mem::swap(resident_key, &mut carry_key);
                    std::mem::swap(resident_entry_id, &mut carry_entry_id);
                    let displaced_dist = *resident_dist;
                    *resident_dist = dist;
                    dist = displaced_dist;
                }
                Slot::Occupied { .. } => {}
            }

            pos = (pos + 1) & self.mask;
            dist += 1;
        }
    }

    /// Removes `key`, backward-shifting the probe chain behind it so later
    /// lookups don't see a gap that would stop probing too early.
    pub fn delete(&mut self, key: &[u8]) -> Option<EntryId> {
        let mut pos = self.ideal_slot(key);
        let mut found = None;

        for _ in 0..MAX_PROBE_DEPTH {
            match &self.slots[pos] {
                Slot::Empty => return None,
                Slot::Occupied { key: k, .. } if k.as_ref() == key => {
                    found = Some(pos);
                    break;
                }
                Slot::Occupied { .. } => {}
            }
            pos = (pos + 1) & self.mask;
        }

        let slot_pos = found?;
        let removed_entry_id = match std::mem::replace(&mut self.slots[slot_pos], Slot::Empty) {
            Slot::Occupied { entry_id, .. } => entry_id,
            Slot::Empty => unreachable!("slot_pos was checked occupied"),
        };
        self.size -= 1;

        let mut hole = slot_pos;
        loop {
            let next = (hole + 1) & self.mask;
            let shift = match &self.slots[next] {
                Slot::Empty => false,
                Slot::Occupied { probe_distance, .. } => *probe_distance > 0,
            };
            if !shift {
                break;
            }
            let moved = std::mem::replace(&mut self.slots[next], Slot::Empty);
            if let Slot::Occupied {
                key,
                entry_id,
                probe_distance,
            } = moved
            {
                self.slots[hole] = Slot::Occupied {
                    key,
                    entry_id,
                    probe_distance: probe_distance - 1,
                };
            }
            hole = next;
        }

        Some(removed_entry_id)
    }

    fn grow(&mut self) -> CacheResult<()> {
        let new_capacity = self.slots.len() * 2;
        let mut new_slots = Vec::new();
        new_slots
            .try_reserve_exact(new_capacity)
            .map_err(|_| CacheError::AllocationFailed)?;
        new_slots.resize_with(new_capacity, || Slot::Empty);

        let old_slots = std::mem::replace(&mut self.slots, new_slots);
        self.mask = new_capacity - 1;
        self.size = 0;

        for slot in old_slots {
            if let Slot::Occupied { key, entry_id, .. } = slot {
                // Every live key was reachable under the old, stricter
                // load factor; re-inserting into double the capacity can
                // never itself overflow the probe window.
                self.try_insert(&key, entry_id)
                    .expect("resize must accommodate all previously live keys");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_miss_on_empty_index() {
        let index = Index::new();
        assert!(index.lookup(b"missing").is_none());
    }

    #[test]
    fn insert_then_lookup_roundtrips() {
        let mut index = Index::new();
        index.upsert(b"k", 7).unwrap();
        assert_eq!(index.lookup(b"k"), Some(7));
    }

    #[test]
    fn upsert_same_key_replaces_without_growing_size() {
        let mut index = Index::new();
        index.upsert(b"k", 1).unwrap();
        let outcome = index.upsert(b"k", 2).unwrap();
        assert!(matches!(outcome, UpsertOutcome::Replaced { old_entry_id: 1 }));
        assert_eq!(index.len(), 1);
        assert_eq!(index.lookup(b"k"), Some(2));
    }

    #[test]
    fn delete_then_lookup_misses() {
        let mut index = Index::new();
        index.upsert(b"k", 1).unwrap();
        assert_eq!(index.delete(b"k"), Some(1));
        assert!(index.lookup(b"k").is_none());
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn grows_past_load_factor_and_keeps_all_keys() {
        let mut index = Index::new();
        let initial_capacity = index.capacity();
        let insert_count = initial_capacity * 2;

        for i in 0..insert_count {
            let key = format!("key-{i}");
            index.upsert(key.as_bytes(), i).unwrap();
        }

        assert!(index.capacity() > initial_capacity);
        assert!((index.len() as f64 / index.capacity() as f64) <= LOAD_FACTOR_THRESHOLD);

        for i in 0..insert_count {
            let key = format!("key-{i}");
            assert_eq!(index.lookup(key.as_bytes()), Some(i));
        }
    }

    #[test]
    fn delete_backward_shift_preserves_lookups_after_swap_chain() {
        let mut index = Index::new();
        // Keys chosen to land in the same initial region and force at
        // least one Robin Hood swap plus a multi-step backward shift on
        // delete.
        let keys = ["a", "b", "c", "d", "e", "f", "g"];
        for (i, key) in keys.iter().enumerate() {
            index.upsert(key.as_bytes(), i).unwrap();
        }

        index.delete(keys[0].as_bytes());

        for (i, key) in keys.iter().enumerate().skip(1) {
            assert_eq!(index.lookup(key.as_bytes()), Some(i));
        }
        assert!(index.lookup(keys[0].as_bytes()).is_none());
    }
}
