//! Classification grid cache.
//!
//! Keeps the most recently used cell grids in memory so repeated lookups in
//! the same cell do not go back to the world store.

mod classification;
mod stats;

pub use classification::{ClassificationCache, DEFAULT_CACHE_CAPACITY};
pub use stats::CacheStats;
