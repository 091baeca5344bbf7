//! Store-level types: dimensions and errors.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::coord::CellCoord;

/// World dimension to read classifications from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dimension {
    #[default]
    Overworld,
    Nether,
    End,
}

impl Dimension {
    /// All supported dimensions.
    pub const ALL: [Dimension; 3] = [Dimension::Overworld, Dimension::Nether, Dimension::End];

    /// Short name used on the command line and in the config file.
    pub fn name(&self) -> &'static str {
        match self {
            Dimension::Overworld => "overworld",
            Dimension::Nether => "nether",
            Dimension::End => "end",
        }
    }

    /// Namespaced dimension identifier.
    pub fn id(&self) -> &'static str {
        match self {
            Dimension::Overworld => "minecraft:overworld",
            Dimension::Nether => "minecraft:the_nether",
            Dimension::End => "minecraft:the_end",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognized dimension name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown dimension '{0}' (expected overworld, nether or end)")]
pub struct UnknownDimension(pub String);

impl FromStr for Dimension {
    type Err = UnknownDimension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Dimension::ALL
            .into_iter()
            .find(|d| d.name() == normalized || d.id() == normalized)
            .ok_or_else(|| UnknownDimension(s.to_string()))
    }
}

/// Errors reported by a world store.
///
/// `Clone` so a single failed load can be handed to every caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The cell has no classification data
    #[error("No data for {0}")]
    NoCell(CellCoord),

    /// The cell exists but reading it failed
    #[error("Failed to load {cell}: {reason}")]
    Load { cell: CellCoord, reason: String },

    /// The cell's grid has neither supported resolution
    #[error("Unsupported classification grid for {cell}: {len} codes")]
    UnsupportedShape { cell: CellCoord, len: usize },

    /// The world could not be opened
    #[error("Failed to open world at {}: {reason}", path.display())]
    Open { path: PathBuf, reason: String },

    /// Releasing the store handle failed
    #[error("Failed to close world store: {0}")]
    Close(String),
}
