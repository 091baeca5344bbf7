//! Classification grid for a single cell.

use thiserror::Error;

use crate::coord::GridResolution;

/// A grid whose code count matches neither supported resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unsupported classification grid shape: {len} codes (expected 256 or 16)")]
pub struct GridShapeError {
    pub len: usize,
}

/// Immutable classification codes for one cell.
///
/// Codes are stored z-major: the code for grid position `(x, z)` lives at
/// `z * side + x`. The resolution is derived from the code count when the
/// grid is built and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationGrid {
    resolution: GridResolution,
    codes: Box<[u32]>,
}

impl ClassificationGrid {
    /// Build a grid from raw codes.
    ///
    /// 256 codes make a 16×16 grid, 16 codes a 4×4 grid.
    pub fn new(codes: Vec<u32>) -> Result<Self, GridShapeError> {
        let resolution =
            GridResolution::from_len(codes.len()).ok_or(GridShapeError { len: codes.len() })?;
        Ok(Self {
            resolution,
            codes: codes.into_boxed_slice(),
        })
    }

    /// Build a grid where every position holds `code`.
    pub fn uniform(resolution: GridResolution, code: u32) -> Self {
        Self {
            resolution,
            codes: vec![code; resolution.code_count()].into_boxed_slice(),
        }
    }

    pub fn resolution(&self) -> GridResolution {
        self.resolution
    }

    /// Code at grid position `(x, z)`.
    ///
    /// # Panics
    ///
    /// Panics if either index is outside the grid's side length.
    pub fn get(&self, x: usize, z: usize) -> u32 {
        let side = self.resolution.side();
        assert!(x < side && z < side, "grid index ({x}, {z}) out of range");
        self.codes[z * side + x]
    }

    pub fn codes(&self) -> &[u32] {
        &self.codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_grid_from_256_codes() {
        let codes: Vec<u32> = (0..256).collect();
        let grid = ClassificationGrid::new(codes).unwrap();

        assert_eq!(grid.resolution(), GridResolution::Full);
        assert_eq!(grid.get(0, 0), 0);
        assert_eq!(grid.get(15, 0), 15);
        assert_eq!(grid.get(0, 1), 16);
        assert_eq!(grid.get(15, 15), 255);
    }

    #[test]
    fn test_quarter_grid_from_16_codes() {
        let codes: Vec<u32> = (100..116).collect();
        let grid = ClassificationGrid::new(codes).unwrap();

        assert_eq!(grid.resolution(), GridResolution::Quarter);
        assert_eq!(grid.get(1, 2), 109);
    }

    #[test]
    fn test_rejects_unsupported_shape() {
        let err = ClassificationGrid::new(vec![0; 1024]).unwrap_err();
        assert_eq!(err, GridShapeError { len: 1024 });

        assert!(ClassificationGrid::new(Vec::new()).is_err());
    }

    #[test]
    fn test_uniform_grid() {
        let grid = ClassificationGrid::uniform(GridResolution::Quarter, 7);
        assert_eq!(grid.codes().len(), 16);
        assert!(grid.codes().iter().all(|&c| c == 7));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_get_out_of_range_panics() {
        let grid = ClassificationGrid::uniform(GridResolution::Quarter, 1);
        grid.get(4, 0);
    }
}
