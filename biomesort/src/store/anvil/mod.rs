//! Anvil world store.
//!
//! Reads biome data straight from the region files of a Minecraft Java world
//! whose chunks carry 2D biome arrays (1.13 through 1.15):
//!
//! - 256 biome ids per chunk → 16×16 grid
//! - 1024 biome ids per chunk (4×4×64) → the bottom 4×4 layer
//!
//! The store never writes to the world directory.

mod biomes;
pub mod nbt;
pub mod region;

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::coord::CellCoord;

use self::nbt::Tag;
use self::region::{read_chunk, read_location, region_file_name, ChunkLocation};
use super::{ClassificationGrid, Dimension, StoreError, StoreOpener, WorldStore};

pub use biomes::biome_name;

/// Biome ids per chunk in the 4×4×64 layout.
const VOLUMETRIC_BIOME_LEN: usize = 1024;
/// Biome ids in one 4×4 layer of the volumetric layout.
const LAYER_LEN: usize = 16;

/// Read-only store over an Anvil world directory.
#[derive(Debug, Clone)]
pub struct AnvilStore {
    world: PathBuf,
}

impl AnvilStore {
    /// Opens the world at `world`.
    ///
    /// The directory must contain a `level.dat` file.
    pub fn open(world: &Path) -> Result<Self, StoreError> {
        if !world.is_dir() {
            return Err(StoreError::Open {
                path: world.to_path_buf(),
                reason: "not a directory".to_string(),
            });
        }
        if !world.join("level.dat").is_file() {
            return Err(StoreError::Open {
                path: world.to_path_buf(),
                reason: "level.dat not found".to_string(),
            });
        }

        info!(world = %world.display(), "Opened Anvil world");
        Ok(Self {
            world: world.to_path_buf(),
        })
    }

    /// Directory holding the region files of `dimension`.
    pub fn region_dir(&self, dimension: Dimension) -> PathBuf {
        match dimension {
            Dimension::Overworld => self.world.join("region"),
            Dimension::Nether => self.world.join("DIM-1").join("region"),
            Dimension::End => self.world.join("DIM1").join("region"),
        }
    }

    fn locate(
        &self,
        cell: CellCoord,
        dimension: Dimension,
    ) -> io::Result<Option<(File, ChunkLocation)>> {
        let path = self.region_dir(dimension).join(region_file_name(cell));
        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(read_location(&mut file, cell)?.map(|location| (file, location)))
    }
}

impl WorldStore for AnvilStore {
    fn has_cell(&mut self, cell: CellCoord, dimension: Dimension) -> bool {
        match self.locate(cell, dimension) {
            Ok(location) => location.is_some(),
            Err(e) => {
                debug!(%cell, error = %e, "Region header unreadable, treating cell as absent");
                false
            }
        }
    }

    fn load_grid(
        &mut self,
        cell: CellCoord,
        dimension: Dimension,
    ) -> Result<ClassificationGrid, StoreError> {
        let load_error = |reason: String| StoreError::Load { cell, reason };

        let (mut file, location) = self
            .locate(cell, dimension)
            .map_err(|e| load_error(e.to_string()))?
            .ok_or(StoreError::NoCell(cell))?;

        let bytes = read_chunk(&mut file, location).map_err(|e| load_error(e.to_string()))?;
        let root = nbt::parse(&bytes).map_err(|e| load_error(e.to_string()))?;

        grid_from_chunk(cell, &root)
    }

    fn code_to_name(&self, code: u32) -> Option<String> {
        biome_name(code)
    }

    fn close(&mut self) -> Result<(), StoreError> {
        debug!(world = %self.world.display(), "Closed Anvil world");
        Ok(())
    }
}

/// Extracts the biome grid from a decoded chunk.
fn grid_from_chunk(cell: CellCoord, root: &Tag) -> Result<ClassificationGrid, StoreError> {
    let Some(level) = root.get("Level") else {
        let reason = if root.get("sections").is_some() {
            "chunk stores biomes per section (3D), which is not supported"
        } else {
            "chunk has no Level compound"
        };
        return Err(StoreError::Load {
            cell,
            reason: reason.to_string(),
        });
    };

    let mut codes: Vec<u32> = match level.get("Biomes") {
        Some(Tag::IntArray(values)) => values.iter().map(|&v| v as u32).collect(),
        Some(Tag::ByteArray(values)) => values.iter().map(|&v| v as u8 as u32).collect(),
        Some(_) => {
            return Err(StoreError::Load {
                cell,
                reason: "Biomes tag has an unexpected type".to_string(),
            })
        }
        None => return Err(StoreError::NoCell(cell)),
    };

    if codes.is_empty() {
        return Err(StoreError::NoCell(cell));
    }
    if codes.len() == VOLUMETRIC_BIOME_LEN {
        codes.truncate(LAYER_LEN);
    }

    ClassificationGrid::new(codes).map_err(|e| StoreError::UnsupportedShape { cell, len: e.len })
}

/// Opens [`AnvilStore`] handles.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnvilOpener;

impl StoreOpener for AnvilOpener {
    fn open(&self, world: &Path) -> Result<Box<dyn WorldStore>, StoreError> {
        Ok(Box::new(AnvilStore::open(world)?))
    }
}
