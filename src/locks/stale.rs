//! Stale lock detection and reclamation.
//!
//! A lock is live only if its record is readable, a process with the recorded
//! pid exists, and that process started at the recorded time. Any other
//! combination means the holder crashed or was killed without releasing, or
//! its pid has since been recycled.

use super::operations::{inspect, read_record, release};
use super::record::LockRecord;
use super::types::{Assessment, LockInfo, LockStatus, Location, StaleReason};
use crate::error::{HighlanderError, Result};
use crate::process::{ProcessTable, same_start_time};
use std::path::Path;
use tracing::{debug, warn};

/// Result of examining an existing lock directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// The holder is alive; the lock was left alone.
    Live(LockRecord),
    /// The holder was gone and its lock directory has been removed.
    Reclaimed(StaleReason),
}

/// Decide whether the holder of the lock at `lock_dir` is still running.
///
/// Read-only. A record that cannot be read (including one that disappeared
/// because the holder just released) counts as stale.
pub fn assess<P: ProcessTable>(lock_dir: &Path, processes: &P) -> Result<Assessment> {
    let record = match read_record(lock_dir) {
        Ok(record) => record,
        Err(HighlanderError::InvalidRecord { path, reason }) => {
            debug!(path = %path.display(), %reason, "unusable lock record");
            return Ok(Assessment::Stale {
                reason: StaleReason::InvalidRecord,
                record: None,
            });
        }
        Err(e) => return Err(e),
    };

    let stale = |reason| Assessment::Stale {
        reason,
        record: Some(record),
    };

    if !processes.exists(record.pid)? {
        return Ok(stale(StaleReason::HolderGone));
    }

    Ok(match processes.start_time(record.pid)? {
        None => stale(StaleReason::HolderGone),
        Some(started) if same_start_time(started, record.start_time) => {
            Assessment::Live(record)
        }
        Some(_) => stale(StaleReason::PidReused),
    })
}

/// Examine an existing lock and remove it if its holder is gone.
pub fn detect<P: ProcessTable>(lock_dir: &Path, processes: &P) -> Result<Detection> {
    match assess(lock_dir, processes)? {
        Assessment::Live(record) => Ok(Detection::Live(record)),
        Assessment::Stale { reason, record } => {
            warn!(
                path = %lock_dir.display(),
                pid = record.map(|r| r.pid),
                %reason,
                "reclaiming stale lock"
            );
            reclaim(lock_dir)?;
            Ok(Detection::Reclaimed(reason))
        }
    }
}

/// Remove a stale lock with the strict release.
///
/// A directory that vanished after it was judged stale was reclaimed (or
/// released) by someone else, which is the outcome wanted here.
fn reclaim(lock_dir: &Path) -> Result<()> {
    match release(lock_dir) {
        Err(HighlanderError::InvalidLockLocation { .. })
            if inspect(lock_dir)? == Location::Absent =>
        {
            debug!(path = %lock_dir.display(), "stale lock already removed");
            Ok(())
        }
        other => other,
    }
}

/// Report who, if anyone, holds the lock at `lock_dir`. Never modifies it.
pub fn status<P: ProcessTable>(lock_dir: &Path, processes: &P) -> Result<LockStatus> {
    match inspect(lock_dir)? {
        Location::Absent => return Ok(LockStatus::Free),
        Location::NotDirectory => {
            return Err(HighlanderError::InvalidLockLocation {
                path: lock_dir.to_path_buf(),
            });
        }
        Location::Directory => {}
    }

    Ok(match assess(lock_dir, processes)? {
        Assessment::Live(record) => LockStatus::Held(LockInfo {
            path: lock_dir.to_path_buf(),
            record,
        }),
        Assessment::Stale { reason, record } => LockStatus::Stale {
            path: lock_dir.to_path_buf(),
            reason,
            record,
        },
    })
}
