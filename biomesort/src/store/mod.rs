//! World store seam.
//!
//! The resolver never talks to world data directly. It goes through a
//! [`WorldStore`] handle produced by a [`StoreOpener`], which keeps the
//! storage format (Anvil region files, an in-memory fixture, ...) out of the
//! lookup logic.
//!
//! Two stores are provided:
//!
//! - [`AnvilStore`] reads biome data from an on-disk Minecraft world
//! - [`MemoryStore`] holds grids in memory, for embedding and tests

pub mod anvil;
mod grid;
mod memory;
mod r#trait;
mod types;

pub use anvil::{AnvilOpener, AnvilStore};
pub use grid::{ClassificationGrid, GridShapeError};
pub use memory::MemoryStore;
pub use r#trait::{StoreOpener, WorldStore};
pub use types::{Dimension, StoreError, UnknownDimension};
