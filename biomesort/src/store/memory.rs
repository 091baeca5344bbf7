//! In-memory world store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::coord::{CellCoord, GridResolution};

use super::{ClassificationGrid, Dimension, StoreError, StoreOpener, WorldStore};

/// What the store holds for a cell.
#[derive(Debug, Clone)]
enum CellData {
    Grid(ClassificationGrid),
    /// Reported by `has_cell` but with no classification data
    Missing,
    /// Raw codes with a length no grid accepts
    Malformed(usize),
}

#[derive(Debug, Default)]
struct MemoryWorld {
    cells: Mutex<HashMap<(Dimension, CellCoord), CellData>>,
    names: Mutex<HashMap<u32, String>>,
    /// Remaining injected load failures per cell
    failures: Mutex<HashMap<CellCoord, usize>>,
    load_counts: Mutex<HashMap<CellCoord, usize>>,
    loads: AtomicUsize,
    opened: Mutex<Vec<PathBuf>>,
    open_error: Mutex<Option<String>>,
    close_error: Mutex<Option<String>>,
    closed: AtomicBool,
}

/// A world store backed by in-memory grids.
///
/// Cloning yields another handle to the same world, so a test can keep one
/// handle for inspection while the session owns the other. The store also
/// acts as its own [`StoreOpener`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    world: Arc<MemoryWorld>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name for a raw code.
    pub fn with_name(self, code: u32, name: impl Into<String>) -> Self {
        self.set_name(code, name);
        self
    }

    /// Register a name for a raw code on a shared handle.
    pub fn set_name(&self, code: u32, name: impl Into<String>) {
        self.world.names.lock().insert(code, name.into());
    }

    /// Store a grid for `cell`.
    pub fn insert_grid(&self, dimension: Dimension, cell: CellCoord, grid: ClassificationGrid) {
        self.world
            .cells
            .lock()
            .insert((dimension, cell), CellData::Grid(grid));
    }

    /// Store a full-resolution grid where every position holds `code`.
    pub fn fill(&self, dimension: Dimension, cell: CellCoord, code: u32) {
        self.insert_grid(
            dimension,
            cell,
            ClassificationGrid::uniform(GridResolution::Full, code),
        );
    }

    /// Mark `cell` as present but without classification data.
    pub fn insert_missing(&self, dimension: Dimension, cell: CellCoord) {
        self.world
            .cells
            .lock()
            .insert((dimension, cell), CellData::Missing);
    }

    /// Mark `cell` as present with `len` codes, which no grid accepts.
    pub fn insert_malformed(&self, dimension: Dimension, cell: CellCoord, len: usize) {
        self.world
            .cells
            .lock()
            .insert((dimension, cell), CellData::Malformed(len));
    }

    /// Make the next `count` loads of `cell` fail with a load error.
    pub fn fail_next_loads(&self, cell: CellCoord, count: usize) {
        self.world.failures.lock().insert(cell, count);
    }

    /// Make every subsequent `open` fail.
    pub fn fail_open(&self, reason: impl Into<String>) {
        *self.world.open_error.lock() = Some(reason.into());
    }

    /// Make every subsequent `close` fail after marking the store closed.
    pub fn fail_close(&self, reason: impl Into<String>) {
        *self.world.close_error.lock() = Some(reason.into());
    }

    /// Total number of `load_grid` calls across all handles.
    pub fn load_count(&self) -> usize {
        self.world.loads.load(Ordering::SeqCst)
    }

    /// Number of `load_grid` calls for one cell.
    pub fn load_count_for(&self, cell: CellCoord) -> usize {
        self.world
            .load_counts
            .lock()
            .get(&cell)
            .copied()
            .unwrap_or(0)
    }

    /// Paths passed to `open`, in order.
    pub fn opened_paths(&self) -> Vec<PathBuf> {
        self.world.opened.lock().clone()
    }

    /// True once any handle has been closed.
    pub fn is_closed(&self) -> bool {
        self.world.closed.load(Ordering::SeqCst)
    }
}

impl WorldStore for MemoryStore {
    fn has_cell(&mut self, cell: CellCoord, dimension: Dimension) -> bool {
        self.world.cells.lock().contains_key(&(dimension, cell))
    }

    fn load_grid(
        &mut self,
        cell: CellCoord,
        dimension: Dimension,
    ) -> Result<ClassificationGrid, StoreError> {
        self.world.loads.fetch_add(1, Ordering::SeqCst);
        *self.world.load_counts.lock().entry(cell).or_insert(0) += 1;

        {
            let mut failures = self.world.failures.lock();
            if let Some(remaining) = failures.get_mut(&cell) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(StoreError::Load {
                        cell,
                        reason: "injected failure".to_string(),
                    });
                }
            }
        }

        match self.world.cells.lock().get(&(dimension, cell)) {
            Some(CellData::Grid(grid)) => Ok(grid.clone()),
            Some(CellData::Malformed(len)) => Err(StoreError::UnsupportedShape { cell, len: *len }),
            Some(CellData::Missing) | None => Err(StoreError::NoCell(cell)),
        }
    }

    fn code_to_name(&self, code: u32) -> Option<String> {
        self.world.names.lock().get(&code).cloned()
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.world.closed.store(true, Ordering::SeqCst);
        match self.world.close_error.lock().clone() {
            Some(reason) => Err(StoreError::Close(reason)),
            None => Ok(()),
        }
    }
}

impl StoreOpener for MemoryStore {
    fn open(&self, world: &Path) -> Result<Box<dyn WorldStore>, StoreError> {
        if let Some(reason) = self.world.open_error.lock().clone() {
            return Err(StoreError::Open {
                path: world.to_path_buf(),
                reason,
            });
        }
        self.world.opened.lock().push(world.to_path_buf());
        Ok(Box::new(self.clone()))
    }
}
