//! Tuning constants shared between the index and the cache coordinator.

/// Number of slots probed before an insertion is considered a probe overflow.
pub const MAX_PROBE_DEPTH: usize = 15;

/// Slot array starts out this large; every resize doubles it.
pub const INITIAL_CAPACITY: usize = 16;

/// Resize is triggered once `size / capacity` exceeds this fraction.
pub const LOAD_FACTOR_THRESHOLD: f64 = 0.7;

/// Nominal sweeper tick cadence.
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 1_000;
