//! No-clobber atomic file publishing.
//!
//! A lock's holder record must never be observed half-written: a reader that
//! finds a truncated record treats the lock as stale and reclaims it. All
//! record writes therefore follow this pattern:
//! 1. Write content to a temporary file in the same directory
//! 2. Sync the file to disk (fsync)
//! 3. Hard-link the temporary file to the target name, which fails with
//!    `AlreadyExists` instead of replacing an existing target
//! 4. Remove the temporary name
//!
//! A crash between steps 1 and 4 can leave the temporary file (named
//! `.{filename}.tmp`) behind. For lock records it lives inside the lock
//! directory and is removed together with it.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Atomically create `path` with `content`, failing if it already exists.
///
/// # Returns
///
/// * `Ok(())` - The target now exists with exactly `content`
/// * `Err(e)` with `e.kind() == AlreadyExists` - The target was already present
///   and has not been modified
/// * `Err(e)` - Any other write, sync, or link failure
pub fn publish_new<P: AsRef<Path>>(path: P, content: &[u8]) -> io::Result<()> {
    let path = path.as_ref();

    if fs::symlink_metadata(path).is_ok() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("'{}' already exists", path.display()),
        ));
    }

    let temp_path = generate_temp_path(path)?;
    write_and_sync(&temp_path, content)?;

    let linked = fs::hard_link(&temp_path, path);
    let _ = fs::remove_file(&temp_path);
    linked?;

    sync_parent(path);
    Ok(())
}

/// Generate a temporary file path in the same directory as the target.
fn generate_temp_path(target: &Path) -> io::Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid file path"))?;

    Ok(parent.join(format!(".{}.tmp", filename)))
}

/// Write content to a file and sync to disk.
fn write_and_sync(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;

    let written = file.write_all(content).and_then(|()| file.sync_all());
    if written.is_err() {
        let _ = fs::remove_file(path);
    }
    written
}

/// Persist the new directory entry. Best effort.
fn sync_parent(path: &Path) {
    if let Some(parent) = path.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }
}
