// robin-cache-common - Shared error type and tuning constants for robin-cache

pub mod constants;
pub mod error;

pub use constants::*;
pub use error::{CacheError, CacheResult};
