//! World session lifecycle.
//!
//! A [`WorldSession`] owns everything needed to answer lookups against one
//! world: the store handle, an optional private snapshot of the world
//! directory, and the classification cache.
//!
//! Resources are acquired snapshot first, then store, and released in the
//! reverse order on [`WorldSession::close`] or on drop. Releasing the
//! snapshot is attempted even when closing the store fails.

mod snapshot;

pub use snapshot::{copy_dir_recursive, Snapshot, SNAPSHOT_PREFIX};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, ClassificationCache, DEFAULT_CACHE_CAPACITY};
use crate::coord::CellCoord;
use crate::store::{ClassificationGrid, Dimension, StoreError, StoreOpener, WorldStore};

/// Errors opening or closing a world session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The world path is not an existing directory
    #[error("World directory not found: {}", .0.display())]
    WorldNotFound(PathBuf),

    /// Copying the world into a snapshot failed
    #[error("Failed to snapshot world {}: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store refused to open the world
    #[error("Failed to open world store: {0}")]
    Open(#[source] StoreError),

    /// The store reported an error while closing
    #[error("Error closing world session: {0}")]
    Close(#[source] StoreError),
}

/// Per-session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Dimension every lookup reads from
    pub dimension: Dimension,
    /// Maximum number of cached grids (0 disables caching)
    pub cache_capacity: usize,
    /// Work on a private copy of the world directory
    pub snapshot: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dimension: Dimension::Overworld,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            snapshot: true,
        }
    }
}

impl SessionConfig {
    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_snapshot(mut self, snapshot: bool) -> Self {
        self.snapshot = snapshot;
        self
    }
}

/// An open world with a cached view of its classification grids.
///
/// Store calls go through a single mutex, so a store that is not safe for
/// concurrent use is still only ever driven by one caller at a time.
pub struct WorldSession {
    dimension: Dimension,
    world_path: PathBuf,
    store: Mutex<Option<Box<dyn WorldStore>>>,
    snapshot: Option<Snapshot>,
    cache: ClassificationCache,
}

impl WorldSession {
    /// Open a session on the world at `world`.
    pub fn open(
        world: &Path,
        config: &SessionConfig,
        opener: &dyn StoreOpener,
    ) -> Result<Self, SessionError> {
        if !world.is_dir() {
            return Err(SessionError::WorldNotFound(world.to_path_buf()));
        }

        let snapshot = if config.snapshot {
            let snapshot = Snapshot::create(world).map_err(|source| SessionError::Snapshot {
                path: world.to_path_buf(),
                source,
            })?;
            Some(snapshot)
        } else {
            None
        };

        let world_path = snapshot
            .as_ref()
            .map(|s| s.world_path().to_path_buf())
            .unwrap_or_else(|| world.to_path_buf());

        // On failure the snapshot is dropped here, removing the copy.
        let store = opener.open(&world_path).map_err(SessionError::Open)?;

        info!(
            world = %world_path.display(),
            dimension = %config.dimension,
            cache_capacity = config.cache_capacity,
            snapshot = config.snapshot,
            "World session opened"
        );

        Ok(Self {
            dimension: config.dimension,
            world_path,
            store: Mutex::new(Some(store)),
            snapshot,
            cache: ClassificationCache::new(config.cache_capacity),
        })
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// The directory the store was opened on (the snapshot copy, if any).
    pub fn world_path(&self) -> &Path {
        &self.world_path
    }

    pub fn is_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Whether the store has any data for `cell`.
    pub fn has_cell(&self, cell: CellCoord) -> bool {
        match self.store.lock().as_mut() {
            Some(store) => store.has_cell(cell, self.dimension),
            None => false,
        }
    }

    /// The grid for `cell`, served from the cache when possible.
    pub fn fetch_grid(&self, cell: CellCoord) -> Result<Arc<ClassificationGrid>, StoreError> {
        self.cache.get(cell, |cell| self.load(cell))
    }

    /// The grid for `cell`, always read from the store.
    pub fn fetch_grid_uncached(
        &self,
        cell: CellCoord,
    ) -> Result<Arc<ClassificationGrid>, StoreError> {
        self.load(cell).map(Arc::new)
    }

    /// Human-readable name for a raw classification code.
    pub fn code_to_name(&self, code: u32) -> Option<String> {
        self.store.lock().as_ref()?.code_to_name(code)
    }

    /// Release the store, then the snapshot.
    pub fn close(mut self) -> Result<(), SessionError> {
        self.release()
    }

    fn load(&self, cell: CellCoord) -> Result<ClassificationGrid, StoreError> {
        debug!(%cell, dimension = %self.dimension, "Loading classification grid");
        match self.store.lock().as_mut() {
            Some(store) => store.load_grid(cell, self.dimension),
            None => Err(StoreError::Load {
                cell,
                reason: "session is closed".to_string(),
            }),
        }
    }

    /// Idempotent: later calls find nothing left to release.
    fn release(&mut self) -> Result<(), SessionError> {
        if self.store.get_mut().is_none() && self.snapshot.is_none() {
            return Ok(());
        }

        let store_result = match self.store.get_mut().take() {
            Some(mut store) => store.close().map_err(SessionError::Close),
            None => Ok(()),
        };

        if let Some(snapshot) = self.snapshot.take() {
            let root = snapshot.root().to_path_buf();
            if let Err(e) = snapshot.remove() {
                warn!(
                    snapshot = %root.display(),
                    error = %e,
                    "Failed to remove world snapshot"
                );
            }
        }

        let stats = self.cache.stats();
        debug!(
            hits = stats.hits,
            misses = stats.misses,
            loads = stats.loads,
            evictions = stats.evictions,
            "World session closed"
        );

        store_result
    }
}

impl Drop for WorldSession {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(error = %e, "Error releasing world session");
        }
    }
}

impl std::fmt::Debug for WorldSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldSession")
            .field("dimension", &self.dimension)
            .field("world_path", &self.world_path)
            .field("snapshot", &self.snapshot.is_some())
            .field("cache", &self.cache)
            .finish()
    }
}
