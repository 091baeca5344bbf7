//! Coordinate mapping module
//!
//! Maps world coordinates to the cell that stores their classification and
//! to the position inside that cell's classification grid.

mod types;

pub use types::{CellCoord, GridResolution, LocalOffset, CELL_SIZE};

/// Converts world coordinates to the containing cell.
///
/// Uses floor division, so negative coordinates map to negative cells
/// (`x = -1` lies in cell `-1`, not `0`).
#[inline]
pub fn to_cell(x: i32, z: i32) -> CellCoord {
    CellCoord {
        x: x.div_euclid(CELL_SIZE),
        z: z.div_euclid(CELL_SIZE),
    }
}

/// Converts world coordinates to their offset inside the containing cell.
///
/// Always non-negative, consistent with [`to_cell`].
#[inline]
pub fn to_local(x: i32, z: i32) -> LocalOffset {
    LocalOffset {
        x: x.rem_euclid(CELL_SIZE) as u8,
        z: z.rem_euclid(CELL_SIZE) as u8,
    }
}

/// Converts world coordinates to both cell and local offset.
#[inline]
pub fn to_cell_and_local(x: i32, z: i32) -> (CellCoord, LocalOffset) {
    (to_cell(x, z), to_local(x, z))
}

/// Converts a local offset to a `(x, z)` index into a grid of the given resolution.
#[inline]
pub fn to_subcell(offset: LocalOffset, resolution: GridResolution) -> (usize, usize) {
    match resolution {
        GridResolution::Full => (offset.x as usize, offset.z as usize),
        GridResolution::Quarter => ((offset.x >> 2) as usize, (offset.z >> 2) as usize),
    }
}
