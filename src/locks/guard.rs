//! RAII lock guard implementation.

use super::operations::{release, release_lenient};
use crate::error::Result;
use std::path::{Path, PathBuf};

/// RAII guard for a claimed lock directory.
///
/// When dropped, including during a panic unwind, the lock directory is
/// removed with the lenient release: a directory that is already gone is not
/// an error, and any other failure is logged as a warning.
#[derive(Debug)]
pub struct LockGuard {
    /// Path to the lock directory.
    path: PathBuf,

    /// Whether the lock has been released manually.
    released: bool,
}

impl LockGuard {
    /// Create a new lock guard for a directory this process just claimed.
    pub(super) fn new(path: PathBuf) -> Self {
        Self {
            path,
            released: false,
        }
    }

    /// Get the path to the lock directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Manually release the lock with the strict release, surfacing errors.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        release(&self.path)
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.released {
            release_lenient(&self.path);
        }
    }
}
