//! Single-instance execution guard.
//!
//! [`guard`] runs a unit of work only if no other live process on this host
//! holds the lock at the same path, and always releases the lock afterwards:
//!
//! ```no_run
//! let ran = highlander::guard(|| 42)?;
//! match ran {
//!     Some(value) => println!("ran: {value}"),
//!     None => println!("already running elsewhere"),
//! }
//! # Ok::<(), highlander::HighlanderError>(())
//! ```
//!
//! # Protocol
//!
//! 1. If the lock directory exists, examine its holder. A live holder means
//!    the work is skipped; a dead one has its lock reclaimed.
//! 2. Create the lock directory. Losing that race means the work is skipped.
//! 3. Record this process's pid and start time in the lock.
//! 4. Run the work, then release the lock on every exit path, panics included.
//!
//! When a reclaimed lock is immediately taken by a concurrent launcher, the
//! whole sequence is retried once; after that the lock is reported as held.
//!
//! A guarded call nested inside work guarded by the same path sees its own
//! process as the live holder and is skipped.

use crate::error::{HighlanderError, Result};
use crate::locks::{
    Detection, LockGuard, LockRecord, Location, detect, inspect, try_claim, write_record,
};
use crate::process::{ProcessTable, SystemProcesses};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the lock directory used when no path is given.
pub const DEFAULT_LOCK_DIR_NAME: &str = ".pid";

/// How many times a lost claim after a reclaim is retried.
const MAX_RECLAIM_RETRIES: usize = 1;

/// The default lock directory, `<current working directory>/.pid`.
///
/// Resolved at call time, so a process that changes directory gets a lock
/// in its new working directory.
pub fn default_lock_dir() -> Result<PathBuf> {
    std::env::current_dir()
        .map(|cwd| cwd.join(DEFAULT_LOCK_DIR_NAME))
        .map_err(|e| HighlanderError::io("resolve working directory for", ".", e))
}

/// Run `work` unless another live process holds the default lock.
///
/// Returns `Ok(None)` when the run was skipped.
pub fn guard<T, F>(work: F) -> Result<Option<T>>
where
    F: FnOnce() -> T,
{
    SingleInstance::in_current_dir()?.run(work)
}

/// Run `work` unless another live process holds the lock at `lock_dir`.
///
/// Returns `Ok(None)` when the run was skipped.
pub fn guard_at<T, F>(lock_dir: impl Into<PathBuf>, work: F) -> Result<Option<T>>
where
    F: FnOnce() -> T,
{
    SingleInstance::new(lock_dir).run(work)
}

/// A lock location together with the process table used to judge holders.
#[derive(Debug, Clone)]
pub struct SingleInstance<P = SystemProcesses> {
    lock_dir: PathBuf,
    processes: P,
}

impl SingleInstance<SystemProcesses> {
    /// Guard the lock at `lock_dir` using the host's process table.
    pub fn new(lock_dir: impl Into<PathBuf>) -> Self {
        Self {
            lock_dir: lock_dir.into(),
            processes: SystemProcesses,
        }
    }

    /// Guard the lock at [`default_lock_dir`].
    pub fn in_current_dir() -> Result<Self> {
        Ok(Self::new(default_lock_dir()?))
    }
}

impl<P: ProcessTable> SingleInstance<P> {
    /// Judge holders with a different process table.
    pub fn with_processes<Q: ProcessTable>(self, processes: Q) -> SingleInstance<Q> {
        SingleInstance {
            lock_dir: self.lock_dir,
            processes,
        }
    }

    /// The guarded lock directory.
    pub fn lock_dir(&self) -> &Path {
        &self.lock_dir
    }

    /// Run `work` while holding the lock.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(value))` - The lock was acquired and `work` returned `value`
    /// * `Ok(None)` - A live process holds the lock; `work` did not run
    /// * `Err(_)` - A fatal lock or process-table failure; `work` did not run
    ///
    /// If `work` panics, the lock is released before the panic propagates.
    pub fn run<T, F>(&self, work: F) -> Result<Option<T>>
    where
        F: FnOnce() -> T,
    {
        let Some(_guard) = self.acquire()? else {
            return Ok(None);
        };
        Ok(Some(work()))
    }

    /// Acquire the lock without running anything.
    ///
    /// Returns `Ok(None)` when a live process holds it. The returned guard
    /// releases the lock when dropped.
    pub fn acquire(&self) -> Result<Option<LockGuard>> {
        self.acquire_with(try_claim)
    }

    /// The acquisition loop, with the directory claim supplied by the caller.
    fn acquire_with<C>(&self, mut claim: C) -> Result<Option<LockGuard>>
    where
        C: FnMut(&Path) -> Result<Option<LockGuard>>,
    {
        let path = self.lock_dir.as_path();
        let own = LockRecord::new(
            self.processes.current_pid(),
            self.processes.current_start_time()?,
        );

        let mut retries = 0;
        loop {
            let reclaimed = match inspect(path)? {
                Location::Absent => false,
                Location::NotDirectory => {
                    return Err(HighlanderError::InvalidLockLocation {
                        path: path.to_path_buf(),
                    });
                }
                Location::Directory => match detect(path, &self.processes)? {
                    Detection::Live(holder) => {
                        info!(path = %path.display(), pid = holder.pid, "already running");
                        return Ok(None);
                    }
                    Detection::Reclaimed(_) => true,
                },
            };

            match claim(path)? {
                Some(guard) => {
                    write_record(guard.path(), &own)?;
                    debug!(path = %path.display(), pid = own.pid, "acquired lock");
                    return Ok(Some(guard));
                }
                None if reclaimed && retries < MAX_RECLAIM_RETRIES => {
                    retries += 1;
                    debug!(path = %path.display(), "lost claim after reclaim, retrying");
                }
                None => {
                    info!(path = %path.display(), "already running");
                    return Ok(None);
                }
            }
        }
    }
}
