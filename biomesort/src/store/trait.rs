//! Store traits.

use std::path::Path;

use crate::coord::CellCoord;

use super::{ClassificationGrid, Dimension, StoreError};

/// Handle to an opened world.
///
/// Methods take `&mut self` because a store may keep per-handle state
/// (open files, decoded headers) and is not required to be thread-safe.
/// Callers that share a store across threads must serialize access.
pub trait WorldStore: Send {
    /// Returns true if the store holds data for `cell` in `dimension`.
    fn has_cell(&mut self, cell: CellCoord, dimension: Dimension) -> bool;

    /// Loads the classification grid for `cell`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NoCell`] if the cell has no classification data
    /// - [`StoreError::Load`] if the cell exists but could not be read
    /// - [`StoreError::UnsupportedShape`] if the data has an unknown layout
    fn load_grid(
        &mut self,
        cell: CellCoord,
        dimension: Dimension,
    ) -> Result<ClassificationGrid, StoreError>;

    /// Translates a raw classification code into its name, if known.
    fn code_to_name(&self, code: u32) -> Option<String>;

    /// Releases the handle. Called once; the store is dropped afterwards.
    fn close(&mut self) -> Result<(), StoreError>;
}

/// Factory for [`WorldStore`] handles.
pub trait StoreOpener: Send + Sync {
    /// Opens the world rooted at `world`.
    fn open(&self, world: &Path) -> Result<Box<dyn WorldStore>, StoreError>;
}
