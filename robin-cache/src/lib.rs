//! # robin-cache
//!
//! An in-process, concurrent key → value cache keyed by arbitrary byte
//! strings, combining three mechanisms behind one coarse lock:
//!
//! - an open-addressed [`Index`](crate::index) with Robin Hood probing and
//!   load-factor-triggered growth,
//! - a recency-ordered [`RecencyList`](crate::list) providing LRU eviction
//!   once `max_items` is exceeded, and
//! - a background [`Cache`] sweeper thread that evicts entries whose TTL
//!   has elapsed.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use robin_cache::Cache;
//!
//! let cache: Arc<Cache<Vec<u8>>> = Cache::new(10_000);
//! cache.put(b"user:123", b"payload".to_vec(), Some(Duration::from_secs(5))).unwrap();
//! assert!(cache.get(b"user:123").is_some());
//! cache.destroy();
//! ```
//!
//! ## Design Principles
//!
//! 1. **Single owned entry**: every binding lives once, in an arena owned
//!    by the cache; the index and recency list hold only arena indices.
//! 2. **Coarse locking**: one `parking_lot::Mutex` covers the index, the
//!    list, and the counter, because keeping them mutually consistent is
//!    harder than any contention it costs.
//! 3. **Expiry is advisory until swept**: `get` never checks TTL itself;
//!    the background sweeper is the sole place expired entries disappear.
//! 4. **Deterministic hashing**: DJB2, chosen for the exact test vectors
//!    this cache is held to, not for raw throughput.

mod cache;
mod entry;
mod hash;
mod index;
mod list;

pub use cache::Cache;
pub use robin_cache_common::{CacheError, CacheResult};
