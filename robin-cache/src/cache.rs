//! Cache coordinator: binds the [`Index`] and [`RecencyList`] into one
//! logical map with a fixed maximum item count and a per-entry TTL, and
//! owns the background sweeper thread.
//!
//! A single `parking_lot::Mutex` protects the index, the recency list, and
//! the item counter together. This is intentionally coarse — the
//! correctness-critical invariant that the index and the list agree on
//! membership is far easier to preserve under one lock than under split
//! locks, and in practice hashing and key comparison dominate lock hold
//! time, not contention. `get` takes the same exclusive lock as `put`
//! because it mutates recency order; there is no shared/read-only path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use robin_cache_common::{CacheResult, DEFAULT_SWEEP_INTERVAL_MS};

use crate::entry::{Arena, Entry};
use crate::index::{Index, UpsertOutcome};
use crate::list::RecencyList;

struct Inner<V> {
    index: Index,
    arena: Arena<V>,
    list: RecencyList,
    max_items: usize,
    current_items: usize,
}

impl<V> Inner<V> {
    fn new(max_items: usize) -> Self {
        Inner {
            index: Index::new(),
            arena: Arena::new(),
            list: RecencyList::new(),
            max_items,
            current_items: 0,
        }
    }

    fn put(&mut self, key: &[u8], value: V, ttl: Option<Duration>) -> CacheResult<()> {
        let now = Instant::now();
        let expires_at = ttl.map(|d| now + d);

        if let Some(entry_id) = self.index.lookup(key) {
            let entry = self.arena.get_mut(entry_id);
            entry.value = Arc::new(value);
            entry.expires_at = expires_at;
            self.list.move_to_front(&mut self.arena, entry_id);
            return Ok(());
        }

        let owned_key: Box<[u8]> = key.into();
        let entry_id = self.arena.insert(Entry {
            key: owned_key,
            value: Arc::new(value),
            expires_at,
            prev: None,
            next: None,
        });

        match self.index.upsert(key, entry_id) {
            Ok(UpsertOutcome::Inserted) => {}
            Ok(UpsertOutcome::Replaced { .. }) => {
                unreachable!("index.lookup already confirmed the key was absent")
            }
            Err(err) => {
                self.arena.remove(entry_id);
                return Err(err);
            }
        }

        self.list.push_front(&mut self.arena, entry_id);
        self.current_items += 1;

        if self.current_items > self.max_items {
            self.evict_one();
        }

        Ok(())
    }

    /// Evicts the current LRU tail. With `max_items == 0` this immediately
    /// evicts the entry `put` just inserted (head and tail are the same
    /// node); harmless but pointless.
    fn evict_one(&mut self) {
        if let Some(evict_id) = self.list.pop_back(&mut self.arena) {
            let evicted = self.arena.remove(evict_id);
            self.index.delete(&evicted.key);
            self.current_items -= 1;
            tracing::debug!(current_items = self.current_items, "evicted LRU entry");
        }
    }

    fn get(&mut self, key: &[u8]) -> Option<&Arc<V>> {
        let entry_id = self.index.lookup(key)?;
        self.list.move_to_front(&mut self.arena, entry_id);
        Some(&self.arena.get(entry_id).value)
    }

    /// Walks the recency list once, pruning every entry whose TTL has
    /// elapsed. The list's only ordering guarantee is recency, not expiry,
    /// so this is a full scan every tick rather than an early-exit walk.
    fn sweep(&mut self, now: Instant) -> usize {
        let mut removed = 0;
        let mut cursor = self.list.head();

        while let Some(id) = cursor {
            let next = self.arena.get(id).next;
            if self.arena.get(id).is_expired(now) {
                self.list.unlink(&mut self.arena, id);
                let entry = self.arena.remove(id);
                self.index.delete(&entry.key);
                self.current_items -= 1;
                removed += 1;
            }
            cursor = next;
        }

        removed
    }

    fn drain(&mut self) {
        while let Some(id) = self.list.pop_back(&mut self.arena) {
            self.arena.remove(id);
        }
        self.current_items = 0;
    }
}

/// A concurrent, bounded, TTL-expiring key to value cache.
///
/// `V` is the caller-supplied value handle; ownership of the bytes or
/// resource it refers to stays with the caller (the cache never
/// interprets or frees it). `get` returns an `Arc<V>` rather than a `V`,
/// so no `Clone` bound on `V` is needed — handing a value to a caller
/// only clones the `Arc`, not the underlying handle. `V: Send + Sync` is
/// required because that `Arc<V>` crosses the boundary between the
/// caller's thread and the cache's internal sweeper thread.
pub struct Cache<V> {
    inner: Mutex<Inner<V>>,
    running: AtomicBool,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<V: Send + Sync + 'static> Cache<V> {
    /// Creates a cache bounded at `max_items`, with the sweeper running at
    /// the nominal one-second cadence.
    pub fn new(max_items: usize) -> Arc<Self> {
        Self::with_sweep_interval(max_items, Duration::from_millis(DEFAULT_SWEEP_INTERVAL_MS))
    }

    /// Like [`Cache::new`] but with a caller-chosen sweeper cadence. Any
    /// non-zero interval is conformant; it only changes how quickly
    /// expired entries become invisible to a subsequent sweep.
    pub fn with_sweep_interval(max_items: usize, interval: Duration) -> Arc<Self> {
        let cache = Arc::new(Cache {
            inner: Mutex::new(Inner::new(max_items)),
            running: AtomicBool::new(true),
            sweeper: Mutex::new(None),
        });

        // The sweeper holds only a `Weak` reference. A strong `Arc` here
        // would keep the cache alive forever once the caller's own handle
        // is dropped without calling `destroy`, since the sweeper would
        // never see its refcount reach zero to stop itself.
        let weak_cache = Arc::downgrade(&cache);
        let handle = thread::spawn(move || run_sweeper(weak_cache, interval));
        *cache.sweeper.lock() = Some(handle);

        cache
    }

    /// Inserts or overwrites `key`. `ttl = None` means the entry never
    /// expires; `ttl = Some(d)` with `d` zero or in spirit "already past"
    /// produces an entry that is already expired and will be pruned on
    /// the next sweeper tick — a `get` that lands between this `put` and
    /// that tick is expected to still succeed.
    pub fn put(&self, key: &[u8], value: V, ttl: Option<Duration>) -> CacheResult<()> {
        self.inner.lock().put(key, value, ttl)
    }

    /// Looks up `key` and, on a hit, moves it to the head of the recency
    /// list. Does not check expiry: an expired-but-not-yet-swept entry is
    /// still visible, by design (see module docs on the sweeper).
    pub fn get(&self, key: &[u8]) -> Option<Arc<V>> {
        self.inner.lock().get(key).cloned()
    }

    /// Number of live entries (mirrors `current_items`).
    pub fn len(&self) -> usize {
        self.inner.lock().current_items
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stops the sweeper, joins it, and releases every remaining entry.
    /// Safe to call more than once, and safe to skip: dropping the last
    /// handle to the cache runs the same teardown via `Drop`.
    pub fn destroy(&self) {
        self.teardown();
    }

    /// Shared by `destroy` and `Drop`. If the last strong reference is
    /// dropped by the sweeper thread itself — it briefly upgrades its
    /// `Weak` each tick, so it can end up holding the final reference —
    /// joining the handle here would be the sweeper thread joining
    /// itself, which deadlocks. That thread is already exiting its loop
    /// on its own once this runs, so the join is skipped in that case.
    fn teardown(&self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.sweeper.lock().take() {
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
        self.inner.lock().drain();
    }
}

impl<V: Send + Sync + 'static> Drop for Cache<V> {
    /// Mirrors `destroy`, so a caller that never calls it explicitly
    /// still stops the sweeper thread and releases every entry once the
    /// last `Arc<Cache<V>>` goes out of scope.
    fn drop(&mut self) {
        self.teardown();
    }
}

fn run_sweeper<V: Send + Sync + 'static>(cache: Weak<Cache<V>>, interval: Duration) {
    let interval = if interval.is_zero() {
        Duration::from_millis(1)
    } else {
        interval
    };

    loop {
        thread::sleep(interval);
        let Some(cache) = cache.upgrade() else {
            break;
        };
        if !cache.running.load(Ordering::Acquire) {
            break;
        }
        let removed = cache.inner.lock().sweep(Instant::now());
        if removed > 0 {
            tracing::debug!(removed, "sweeper pruned expired entries");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_roundtrips() {
        let cache = Cache::new(8);
        cache.put(b"k", 1u32, None).unwrap();
        assert_eq!(cache.get(b"k").as_deref(), Some(&1));
        cache.destroy();
    }

    #[test]
    fn overwrite_refreshes_value_and_ttl() {
        let cache = Cache::new(8);
        cache.put(b"k", 1u32, Some(Duration::from_secs(60))).unwrap();
        cache.put(b"k", 2u32, Some(Duration::from_secs(60))).unwrap();
        assert_eq!(cache.get(b"k").as_deref(), Some(&2));
        assert_eq!(cache.len(), 1);
        cache.destroy();
    }

    #[test]
    fn lru_eviction_order() {
        let cache = Cache::new(3);
        cache.put(b"a", 'a', None).unwrap();
        cache.put(b"b", 'b', None).unwrap();
        cache.put(b"c", 'c', None).unwrap();
        assert_eq!(cache.get(b"a").as_deref(), Some(&'a'));
        cache.put(b"d", 'd', None).unwrap();

        assert_eq!(cache.get(b"b"), None);
        assert_eq!(cache.get(b"a").as_deref(), Some(&'a'));
        assert_eq!(cache.get(b"c").as_deref(), Some(&'c'));
        assert_eq!(cache.get(b"d").as_deref(), Some(&'d'));
        cache.destroy();
    }

    #[test]
    fn zero_capacity_cache_accepts_and_immediately_evicts() {
        let cache = Cache::new(0);
        cache.put(b"k", 1u32, None).unwrap();
        assert_eq!(cache.get(b"k"), None);
        assert_eq!(cache.len(), 0);
        cache.destroy();
    }

    #[test]
    fn single_entry_cache_move_to_front_is_noop_and_eviction_empties() {
        let cache = Cache::new(1);
        cache.put(b"a", 1u32, None).unwrap();
        assert_eq!(cache.get(b"a").as_deref(), Some(&1));
        cache.put(b"b", 2u32, None).unwrap();
        assert_eq!(cache.get(b"a"), None);
        assert_eq!(cache.get(b"b").as_deref(), Some(&2));
        cache.destroy();
    }

    #[test]
    fn expired_entry_is_pruned_by_sweeper() {
        let cache = Cache::with_sweep_interval(8, Duration::from_millis(20));
        cache.put(b"k", 1u32, Some(Duration::from_millis(1))).unwrap();
        thread::sleep(Duration::from_millis(60));
        assert_eq!(cache.get(b"k"), None);
        cache.destroy();
    }

    #[test]
    fn negative_or_zero_ttl_expires_on_next_tick() {
        let cache = Cache::with_sweep_interval(8, Duration::from_millis(10));
        cache.put(b"k", 1u32, Some(Duration::ZERO)).unwrap();
        thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get(b"k"), None);
        cache.destroy();
    }

    #[test]
    fn never_expires_without_ttl() {
        let cache = Cache::with_sweep_interval(8, Duration::from_millis(10));
        cache.put(b"k", 1u32, None).unwrap();
        thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get(b"k").as_deref(), Some(&1));
        cache.destroy();
    }

    #[test]
    fn resize_preserves_all_keys() {
        let cache = Cache::new(10_000);
        let count = 64usize;
        for i in 0..count {
            let key = format!("key-{i}");
            cache.put(key.as_bytes(), i, None).unwrap();
        }
        for i in 0..count {
            let key = format!("key-{i}");
            assert_eq!(cache.get(key.as_bytes()).as_deref(), Some(&i));
        }
        cache.destroy();
    }

    #[test]
    fn dropping_last_handle_without_destroy_stops_the_sweeper() {
        let cache = Cache::with_sweep_interval(8, Duration::from_millis(10));
        cache.put(b"k", 1u32, None).unwrap();
        let weak = Arc::downgrade(&cache);
        drop(cache);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn concurrent_put_get_does_not_deadlock_and_stays_within_capacity() {
        let cache = Cache::new(1_000);
        let mut handles = Vec::new();

        for t in 0..16 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                let mut state = 0x9E3779B9u64.wrapping_add(t as u64);
                let mut next = move || {
                    state ^= state << 13;
                    state ^= state >> 7;
                    state ^= state << 17;
                    state
                };

                for _ in 0..10_000 {
                    let idx = next() % 2_000;
                    let key = format!("key-{idx}");
                    if next() % 2 == 0 {
                        cache.put(key.as_bytes(), idx, None).unwrap();
                    } else {
                        let _ = cache.get(key.as_bytes());
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= 1_000);
        cache.destroy();
    }
}
