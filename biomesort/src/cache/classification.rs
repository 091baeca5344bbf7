//! Bounded LRU cache of classification grids.
//!
//! Grids are keyed by cell. Recency is a monotonically increasing access
//! tick; the entry with the smallest tick is evicted first once the cache
//! holds more than its capacity.
//!
//! # Single-flight loads
//!
//! Concurrent misses for the same cell collapse into one loader call:
//!
//! ```text
//! get(A) ─┐
//!         │          one loader(A) call
//! get(A) ─┼──► ClassificationCache ──────────► store
//!         │          │
//! get(A) ─┘          ▼
//!               all callers receive the same result
//! ```
//!
//! The loader runs outside the cache lock, so misses for different cells
//! load in parallel. Failed loads are handed to every waiter but never
//! cached; the next `get` for that cell calls the loader again.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace};

use super::stats::{CacheStats, Counters};
use crate::coord::CellCoord;
use crate::store::{ClassificationGrid, StoreError};

/// Default number of grids held by a cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

type LoadResult = Result<Arc<ClassificationGrid>, StoreError>;

struct Entry {
    grid: Arc<ClassificationGrid>,
    tick: u64,
}

/// A load in progress. Waiters block on `done` until `result` is set.
struct Flight {
    result: Mutex<Option<LoadResult>>,
    done: Condvar,
}

impl Flight {
    fn new() -> Self {
        Self {
            result: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    fn publish(&self, result: LoadResult) {
        *self.result.lock() = Some(result);
        self.done.notify_all();
    }

    fn wait(&self) -> LoadResult {
        let mut slot = self.result.lock();
        loop {
            if let Some(result) = slot.as_ref() {
                return result.clone();
            }
            self.done.wait(&mut slot);
        }
    }
}

#[derive(Default)]
struct LruState {
    entries: HashMap<CellCoord, Entry>,
    /// tick -> cell, oldest first
    recency: BTreeMap<u64, CellCoord>,
    next_tick: u64,
    in_flight: HashMap<CellCoord, Arc<Flight>>,
}

impl LruState {
    fn bump(&mut self) -> u64 {
        let tick = self.next_tick;
        self.next_tick += 1;
        tick
    }

    /// Returns the cached grid and marks it most recently used.
    fn touch(&mut self, cell: CellCoord) -> Option<Arc<ClassificationGrid>> {
        if !self.entries.contains_key(&cell) {
            return None;
        }
        let tick = self.bump();
        let entry = self.entries.get_mut(&cell)?;
        self.recency.remove(&entry.tick);
        entry.tick = tick;
        self.recency.insert(tick, cell);
        Some(Arc::clone(&entry.grid))
    }

    fn insert(&mut self, cell: CellCoord, grid: Arc<ClassificationGrid>) {
        let tick = self.bump();
        if let Some(old) = self.entries.insert(cell, Entry { grid, tick }) {
            self.recency.remove(&old.tick);
        }
        self.recency.insert(tick, cell);
    }

    /// Evicts least recently used entries until at most `capacity` remain.
    fn evict_over(&mut self, capacity: usize) -> u64 {
        let mut evicted = 0;
        while self.entries.len() > capacity {
            let Some((_, cell)) = self.recency.pop_first() else {
                break;
            };
            self.entries.remove(&cell);
            evicted += 1;
            trace!(%cell, "Evicted classification grid");
        }
        evicted
    }
}

/// Bounded, thread-safe LRU cache of classification grids with
/// single-flight loading.
pub struct ClassificationCache {
    capacity: usize,
    state: Mutex<LruState>,
    counters: Counters,
}

impl ClassificationCache {
    /// Create a cache holding at most `capacity` grids.
    ///
    /// A capacity of 0 disables caching: every `get` calls the loader.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(LruState::default()),
            counters: Counters::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True if caching is disabled.
    pub fn is_pass_through(&self) -> bool {
        self.capacity == 0
    }

    /// Number of grids currently cached.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if a grid for `cell` is cached, without touching its recency.
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.state.lock().entries.contains_key(&cell)
    }

    /// Drop every cached grid. In-flight loads are unaffected.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.recency.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.len())
    }

    /// Get the grid for `cell`, calling `loader` on a miss.
    ///
    /// Loader errors are returned as-is and not cached.
    pub fn get<F>(&self, cell: CellCoord, loader: F) -> LoadResult
    where
        F: FnOnce(CellCoord) -> Result<ClassificationGrid, StoreError>,
    {
        if self.is_pass_through() {
            Counters::incr(&self.counters.misses);
            return self.call_loader(cell, loader);
        }

        let flight = {
            let mut state = self.state.lock();
            if let Some(grid) = state.touch(cell) {
                Counters::incr(&self.counters.hits);
                return Ok(grid);
            }
            Counters::incr(&self.counters.misses);

            if let Some(flight) = state.in_flight.get(&cell) {
                let flight = Arc::clone(flight);
                drop(state);
                Counters::incr(&self.counters.coalesced);
                debug!(%cell, "Waiting for in-flight grid load");
                return flight.wait();
            }

            let flight = Arc::new(Flight::new());
            state.in_flight.insert(cell, Arc::clone(&flight));
            flight
        };

        let guard = FlightGuard {
            cache: self,
            cell,
            flight,
            completed: false,
        };
        let result = self.call_loader(cell, loader);
        guard.complete(result)
    }

    fn call_loader<F>(&self, cell: CellCoord, loader: F) -> LoadResult
    where
        F: FnOnce(CellCoord) -> Result<ClassificationGrid, StoreError>,
    {
        Counters::incr(&self.counters.loads);
        let result = loader(cell).map(Arc::new);
        if result.is_err() {
            Counters::incr(&self.counters.load_failures);
        }
        result
    }
}

impl std::fmt::Debug for ClassificationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationCache")
            .field("capacity", &self.capacity)
            .field("entries", &self.len())
            .finish()
    }
}

/// Owns an in-flight slot until the load finishes.
///
/// If the loader unwinds, `Drop` clears the slot and wakes waiters with a
/// load error so they never block forever.
struct FlightGuard<'a> {
    cache: &'a ClassificationCache,
    cell: CellCoord,
    flight: Arc<Flight>,
    completed: bool,
}

impl FlightGuard<'_> {
    fn complete(mut self, result: LoadResult) -> LoadResult {
        {
            let mut state = self.cache.state.lock();
            state.in_flight.remove(&self.cell);
            if let Ok(grid) = &result {
                state.insert(self.cell, Arc::clone(grid));
                let evicted = state.evict_over(self.cache.capacity);
                self.cache
                    .counters
                    .evictions
                    .fetch_add(evicted, std::sync::atomic::Ordering::Relaxed);
            }
        }
        self.flight.publish(result.clone());
        self.completed = true;
        result
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        self.cache.state.lock().in_flight.remove(&self.cell);
        self.flight.publish(Err(StoreError::Load {
            cell: self.cell,
            reason: "grid loader panicked".to_string(),
        }));
    }
}
