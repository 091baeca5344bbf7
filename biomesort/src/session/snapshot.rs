//! Private copies of a world directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info};

/// Prefix of snapshot directories created under the system temp dir.
pub const SNAPSHOT_PREFIX: &str = "biomesort_world_";

/// An exclusively owned copy of a world directory.
///
/// The copy lives in a fresh temporary directory. It is removed by
/// [`Snapshot::remove`], or when the snapshot is dropped.
#[derive(Debug)]
pub struct Snapshot {
    dir: TempDir,
    world: PathBuf,
}

impl Snapshot {
    /// Copy `source` recursively into a new temporary directory.
    pub fn create(source: &Path) -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix(SNAPSHOT_PREFIX).tempdir()?;
        let name = source
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "world".into());
        let world = dir.path().join(name);

        let copied = copy_dir_recursive(source, &world)?;
        info!(
            source = %source.display(),
            snapshot = %world.display(),
            files = copied,
            "Created world snapshot"
        );

        Ok(Self { dir, world })
    }

    /// Path of the copied world.
    pub fn world_path(&self) -> &Path {
        &self.world
    }

    /// Root of the temporary directory holding the copy.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Delete the snapshot directory now, reporting failures.
    pub fn remove(self) -> io::Result<()> {
        let root = self.dir.path().to_path_buf();
        self.dir.close()?;
        debug!(snapshot = %root.display(), "Removed world snapshot");
        Ok(())
    }
}

/// Copy the tree at `src` to `dst`, returning the number of files copied.
///
/// Symlinks are followed. `dst` must not exist yet.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<u64> {
    fs::create_dir(dst)?;
    let mut copied = 0;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());

        if fs::metadata(&from)?.is_dir() {
            copied += copy_dir_recursive(&from, &to)?;
        } else {
            fs::copy(&from, &to)?;
            copied += 1;
        }
    }

    Ok(copied)
}
