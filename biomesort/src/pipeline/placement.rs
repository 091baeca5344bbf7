//! Moving files into place without clobbering.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

use tracing::{debug, warn};

/// Move `source` to `target`, refusing to replace an existing file.
///
/// Tries an atomic rename first. When source and target live on different
/// filesystems the file is copied into a freshly created target, the copy's
/// length is checked, and only then is the source removed.
///
/// Fails with [`io::ErrorKind::AlreadyExists`] if `target` is taken.
pub fn move_file(source: &Path, target: &Path) -> io::Result<()> {
    if target.symlink_metadata().is_ok() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", target.display()),
        ));
    }

    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device(&e) => {
            debug!(
                source = %source.display(),
                target = %target.display(),
                "Rename crosses filesystems, copying instead"
            );
            copy_then_remove(source, target)
        }
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn is_cross_device(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::EXDEV)
}

#[cfg(not(unix))]
fn is_cross_device(_err: &io::Error) -> bool {
    false
}

/// Copy `source` into a new file at `target`, then delete `source`.
///
/// On any failure the target is removed and the source is kept, so a failed
/// move never leaves two copies behind.
pub(crate) fn copy_then_remove(source: &Path, target: &Path) -> io::Result<()> {
    copy_then_remove_with(source, target, |p: &Path| fs::remove_file(p))
}

fn copy_then_remove_with<F>(source: &Path, target: &Path, remove_source: F) -> io::Result<()>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    let metadata = fs::metadata(source)?;
    let expected = metadata.len();

    let mut reader = File::open(source)?;
    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)?;

    let copied = io::copy(&mut reader, &mut writer).and_then(|n| {
        writer.sync_all()?;
        Ok(n)
    });
    drop(writer);

    match copied {
        Ok(n) if n == expected => {}
        Ok(n) => {
            let _ = fs::remove_file(target);
            return Err(io::Error::other(format!(
                "copy of {} was truncated: {} of {} bytes",
                source.display(),
                n,
                expected
            )));
        }
        Err(e) => {
            let _ = fs::remove_file(target);
            return Err(e);
        }
    }

    // Permissions are best effort; the data is already safe.
    let _ = fs::set_permissions(target, metadata.permissions());

    if let Err(e) = remove_source(source) {
        if let Err(cleanup) = fs::remove_file(target) {
            warn!(
                target = %target.display(),
                error = %cleanup,
                "Could not remove copy after failing to delete the source"
            );
        }
        return Err(e);
    }
    Ok(())
}
