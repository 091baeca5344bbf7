//! Coordinate to classification resolution.
//!
//! Turns a world coordinate into a category name by locating the cell,
//! fetching its grid through the session and naming the code at the
//! coordinate's position. Load errors get one uncached retry before the
//! lookup is reported as failed.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::coord::{to_cell_and_local, to_subcell, CellCoord};
use crate::session::WorldSession;
use crate::store::{ClassificationGrid, StoreError};

/// Why a lookup could not produce a classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The store failed to load the cell, twice
    LoadError(String),
    /// The cell's grid has neither supported resolution
    UnsupportedGridShape { len: usize },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadError(reason) => write!(f, "load error: {}", reason),
            Self::UnsupportedGridShape { len } => {
                write!(f, "unsupported grid shape ({} codes)", len)
            }
        }
    }
}

/// Result of resolving one coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The category name at the coordinate
    Named(String),
    /// The world has no data there
    Absent,
    /// Data exists but could not be read
    Failed(FailureKind),
}

impl Classification {
    /// The category name, if one was resolved.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            _ => None,
        }
    }
}

/// Name used for codes the store cannot name.
pub fn unknown_name(code: u32) -> String {
    format!("unknown({})", code)
}

/// Resolves world coordinates against an open session.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    session: &'a WorldSession,
}

impl<'a> Resolver<'a> {
    pub fn new(session: &'a WorldSession) -> Self {
        Self { session }
    }

    /// Classification at world position `(x, z)`.
    pub fn resolve(&self, x: i32, z: i32) -> Classification {
        let (cell, local) = to_cell_and_local(x, z);

        if !self.session.has_cell(cell) {
            debug!(x, z, %cell, "Cell not present in world");
            return Classification::Absent;
        }

        let grid = match self.fetch(cell) {
            Ok(grid) => grid,
            Err(outcome) => return outcome,
        };

        let (gx, gz) = to_subcell(local, grid.resolution());
        let code = grid.get(gx, gz);
        let name = self
            .session
            .code_to_name(code)
            .unwrap_or_else(|| unknown_name(code));

        debug!(x, z, %cell, code, name = %name, "Resolved classification");
        Classification::Named(name)
    }

    fn fetch(&self, cell: CellCoord) -> Result<Arc<ClassificationGrid>, Classification> {
        match self.session.fetch_grid(cell) {
            Ok(grid) => Ok(grid),
            Err(StoreError::Load { reason, .. }) => {
                warn!(%cell, reason = %reason, "Grid load failed, retrying uncached");
                self.session
                    .fetch_grid_uncached(cell)
                    .map_err(|e| match e {
                        StoreError::NoCell(_) => Classification::Absent,
                        other => Self::failure(other),
                    })
            }
            Err(other) => Err(Self::failure(other)),
        }
    }

    fn failure(err: StoreError) -> Classification {
        match err {
            StoreError::NoCell(_) => Classification::Absent,
            StoreError::UnsupportedShape { len, .. } => {
                Classification::Failed(FailureKind::UnsupportedGridShape { len })
            }
            other => Classification::Failed(FailureKind::LoadError(other.to_string())),
        }
    }
}
