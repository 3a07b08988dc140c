//! Lock storage: claiming, recording, reading, and releasing lock directories.
//!
//! The lock directory exists if and only if some process claims the lock, and
//! the `INFO` file inside it holds exactly one holder record.

use super::guard::LockGuard;
use super::record::{LockRecord, ParseRecordError};
use super::types::{Claim, Location, ReleaseMode};
use crate::error::{HighlanderError, Result};
use crate::fs::publish_new;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the holder record file inside a lock directory.
pub const INFO_FILE: &str = "INFO";

/// Path of the holder record for the lock at `lock_dir`.
pub fn info_path(lock_dir: &Path) -> PathBuf {
    lock_dir.join(INFO_FILE)
}

/// Classify what currently occupies `lock_dir`. Symlinks are not followed.
pub fn inspect(lock_dir: &Path) -> Result<Location> {
    match fs::symlink_metadata(lock_dir) {
        Ok(meta) if meta.is_dir() => Ok(Location::Directory),
        Ok(_) => Ok(Location::NotDirectory),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Location::Absent),
        Err(e) => Err(HighlanderError::io("inspect lock", lock_dir, e)),
    }
}

/// Attempt to claim the lock by creating its directory.
///
/// Exactly one of any number of concurrent callers observes
/// [`Claim::Claimed`]; the rest observe [`Claim::AlreadyHeld`]. Parent
/// directories are never created, so a missing parent is a claim error.
///
/// # Returns
///
/// * `Ok(Claim::Claimed)` - This caller created the directory
/// * `Ok(Claim::AlreadyHeld)` - Something already exists at `lock_dir`
/// * `Err(HighlanderError::Claim)` - Any other creation failure
pub fn claim(lock_dir: &Path) -> Result<Claim> {
    match fs::create_dir(lock_dir) {
        Ok(()) => {
            debug!(path = %lock_dir.display(), "claimed lock directory");
            Ok(Claim::Claimed)
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(Claim::AlreadyHeld),
        Err(e) => Err(HighlanderError::Claim {
            path: lock_dir.to_path_buf(),
            source: e,
        }),
    }
}

/// Claim the lock and return a guard that releases it when dropped.
///
/// Returns `Ok(None)` when the lock is already held.
pub fn try_claim(lock_dir: &Path) -> Result<Option<LockGuard>> {
    Ok(match claim(lock_dir)? {
        Claim::Claimed => Some(LockGuard::new(lock_dir.to_path_buf())),
        Claim::AlreadyHeld => None,
    })
}

/// Write the holder record into a claimed lock directory.
///
/// # Returns
///
/// * `Ok(())` - The record was written
/// * `Err(HighlanderError::RecordAlreadyExists)` - A record is already present;
///   it is left untouched
/// * `Err(HighlanderError::Io)` - The record could not be written
pub fn write_record(lock_dir: &Path, record: &LockRecord) -> Result<()> {
    let path = info_path(lock_dir);

    publish_new(&path, record.encode().as_bytes()).map_err(|e| {
        if e.kind() == ErrorKind::AlreadyExists {
            HighlanderError::RecordAlreadyExists { path: path.clone() }
        } else {
            HighlanderError::io("write lock record", &path, e)
        }
    })
}

/// Read the holder record of the lock at `lock_dir`.
///
/// A missing, unreadable, empty, or malformed record is reported as
/// [`HighlanderError::InvalidRecord`].
pub fn read_record(lock_dir: &Path) -> Result<LockRecord> {
    let path = info_path(lock_dir);

    let content = fs::read_to_string(&path).map_err(|e| HighlanderError::InvalidRecord {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    content
        .parse()
        .map_err(|e: ParseRecordError| HighlanderError::InvalidRecord {
            path,
            reason: e.to_string(),
        })
}

/// Remove the lock directory and everything in it.
///
/// This is the explicit, strict release: it fails with
/// [`HighlanderError::InvalidLockLocation`] unless `lock_dir` is an existing
/// directory.
pub fn release(lock_dir: &Path) -> Result<()> {
    release_with(lock_dir, ReleaseMode::Strict)
}

/// Remove the lock directory using the given [`ReleaseMode`].
pub fn release_with(lock_dir: &Path, mode: ReleaseMode) -> Result<()> {
    if mode == ReleaseMode::Strict && inspect(lock_dir)? != Location::Directory {
        return Err(HighlanderError::InvalidLockLocation {
            path: lock_dir.to_path_buf(),
        });
    }

    match fs::remove_dir_all(lock_dir) {
        Ok(()) => {
            debug!(path = %lock_dir.display(), "released lock directory");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound && mode == ReleaseMode::Lenient => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(HighlanderError::InvalidLockLocation {
            path: lock_dir.to_path_buf(),
        }),
        Err(e) => Err(HighlanderError::io("remove lock", lock_dir, e)),
    }
}

/// Release the lock at the end of guarded work.
///
/// Never fails: a lock that is already gone is fine, and any other removal
/// failure is logged.
pub fn release_lenient(lock_dir: &Path) {
    if let Err(e) = release_with(lock_dir, ReleaseMode::Lenient) {
        warn!(path = %lock_dir.display(), error = %e, "failed to release lock");
    }
}
