//! Coordinate type definitions

use std::fmt;

/// Side length of a cell in world units.
pub const CELL_SIZE: i32 = 16;

/// Cell coordinates: the floor-division of a world coordinate by [`CELL_SIZE`].
///
/// In Minecraft terms this is a chunk position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    /// Cell X (east-west)
    pub x: i32,
    /// Cell Z (north-south)
    pub z: i32,
}

impl CellCoord {
    /// Create a cell coordinate.
    #[inline]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Region coordinates containing this cell (32×32 cells per region).
    #[inline]
    pub const fn region(&self) -> (i32, i32) {
        (self.x >> 5, self.z >> 5)
    }

    /// Position of this cell inside its region, each in `0..32`.
    #[inline]
    pub const fn region_local(&self) -> (usize, usize) {
        ((self.x & 31) as usize, (self.z & 31) as usize)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell({}, {})", self.x, self.z)
    }
}

/// Offset of a world coordinate inside its cell, each component in `0..16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalOffset {
    pub x: u8,
    pub z: u8,
}

/// Resolution of a classification grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridResolution {
    /// 16×16: one code per world unit
    Full,
    /// 4×4: one code per 4×4 block of world units
    Quarter,
}

impl GridResolution {
    /// Number of codes along one side of the grid.
    #[inline]
    pub const fn side(&self) -> usize {
        match self {
            GridResolution::Full => 16,
            GridResolution::Quarter => 4,
        }
    }

    /// Total number of codes in a grid of this resolution.
    #[inline]
    pub const fn code_count(&self) -> usize {
        self.side() * self.side()
    }

    /// Resolution for a grid holding `len` codes, if supported.
    pub const fn from_len(len: usize) -> Option<Self> {
        match len {
            256 => Some(GridResolution::Full),
            16 => Some(GridResolution::Quarter),
            _ => None,
        }
    }
}

impl fmt::Display for GridResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = self.side();
        write!(f, "{}x{}", side, side)
    }
}
