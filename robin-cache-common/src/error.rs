//! Error type for `robin-cache`.
//!
//! `get` never fails: absence is a value, not an error. Only insertion
//! paths that hit an allocation failure or an unrecoverable probe
//! overflow surface an error; the cache is left in its prior consistent
//! state on every error path.

use thiserror::Error;

/// Result alias used across the cache coordinator and index.
pub type CacheResult<T> = Result<T, CacheError>;

/// Failure kinds a `put` can surface.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum CacheError {
    /// The entry arena, key buffer, or resized slot array could not be
    /// allocated. The index, recency list, and counter are unchanged.
    #[error("allocation failed while inserting into the cache")]
    AllocationFailed,

    /// The probe window was exhausted even after a resize. This indicates
    /// the resize policy itself is broken (capacity growth should always
    /// make room before the next probe budget is exceeded) rather than a
    /// caller error.
    #[error("probe depth exceeded after resize")]
    ProbeOverflow,
}
