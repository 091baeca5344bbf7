//! Cache statistics tracking and reporting.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from a cached grid
    pub hits: u64,
    /// Lookups that had to load (or wait for) a grid
    pub misses: u64,
    /// Calls made to the loader
    pub loads: u64,
    /// Loader calls that returned an error
    pub load_failures: u64,
    /// Misses that waited on another caller's in-flight load
    pub coalesced: u64,
    /// Entries dropped to stay within capacity
    pub evictions: u64,
    /// Entries currently held
    pub entries: usize,
}

impl CacheStats {
    /// Hit rate over all lookups (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Lock-free counters backing [`CacheStats`].
#[derive(Debug, Default)]
pub(super) struct Counters {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub loads: AtomicU64,
    pub load_failures: AtomicU64,
    pub coalesced: AtomicU64,
    pub evictions: AtomicU64,
}

impl Counters {
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries,
        }
    }
}
