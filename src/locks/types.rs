//! Lock outcome and status types.

use super::record::LockRecord;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Outcome of an attempt to create the lock directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// This caller created the directory and now holds the lock.
    Claimed,
    /// The directory already existed; someone else holds (or held) the lock.
    AlreadyHeld,
}

/// What currently occupies a lock path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Absent,
    Directory,
    /// Something other than a directory; never a valid lock.
    NotDirectory,
}

/// How strictly a release treats a lock that is not there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseMode {
    /// Tolerate the directory already being gone. Used when guarded work ends.
    Lenient,
    /// Fail with `InvalidLockLocation` unless the path is an existing directory.
    Strict,
}

/// Why an existing lock is considered abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleReason {
    /// The holder record is missing or unreadable.
    InvalidRecord,
    /// No process with the recorded identifier exists.
    HolderGone,
    /// The identifier now belongs to a process with a different start time.
    PidReused,
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StaleReason::InvalidRecord => "holder record is missing or invalid",
            StaleReason::HolderGone => "holder process no longer exists",
            StaleReason::PidReused => "holder pid was reused by another process",
        })
    }
}

/// Liveness verdict for an existing lock directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assessment {
    /// The recorded holder is still running.
    Live(LockRecord),
    /// The lock was abandoned and may be reclaimed.
    Stale {
        reason: StaleReason,
        record: Option<LockRecord>,
    },
}

/// Information about a live lock.
#[derive(Debug, Clone)]
pub struct LockInfo {
    /// The lock directory.
    pub path: PathBuf,

    /// The recorded holder.
    pub record: LockRecord,
}

impl LockInfo {
    /// When the holder process started, if representable.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.record.started_at()
    }

    /// How long the holder has been running.
    pub fn age(&self) -> Option<Duration> {
        self.started_at()
            .map(|started| Utc::now().signed_duration_since(started))
    }

    /// Format the age as a human-readable string.
    pub fn age_string(&self) -> String {
        let Some(age) = self.age() else {
            return "unknown".to_string();
        };
        let minutes = age.num_minutes();
        let hours = age.num_hours();
        let days = age.num_days();

        if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else {
            format!("{}m", minutes)
        }
    }
}

impl fmt::Display for LockInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (pid: {}, running for: {})",
            self.path.display(),
            self.record.pid,
            self.age_string()
        )
    }
}

/// Read-only view of a lock path.
#[derive(Debug, Clone)]
pub enum LockStatus {
    /// No lock directory exists.
    Free,
    /// A live process holds the lock.
    Held(LockInfo),
    /// A lock directory exists but its holder is gone.
    Stale {
        path: PathBuf,
        reason: StaleReason,
        record: Option<LockRecord>,
    },
}

impl LockStatus {
    /// Whether a live process holds the lock.
    pub fn is_held(&self) -> bool {
        matches!(self, LockStatus::Held(_))
    }
}
