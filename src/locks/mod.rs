//! Locking subsystem for highlander.
//!
//! A lock is a directory; it exists if and only if some process claims to
//! hold it.
//!
//! # Lock Directories
//!
//! The lock is claimed by creating its directory with a plain `create_dir`,
//! which the filesystem serializes: among any number of concurrent
//! attempts, exactly one succeeds. Nothing else is used for mutual
//! exclusion.
//!
//! # Holder Records
//!
//! Right after a claim, the holder writes an `INFO` file into the directory
//! containing `"<pid> <start_time>"`, with the start time in seconds to six
//! fractional digits. The start time tells a live holder apart from an
//! unrelated process that was later given the same pid.
//!
//! # Stale Locks
//!
//! A holder that crashes or is killed leaves its directory behind. Before
//! claiming, an existing lock is checked against the process table and
//! removed if its holder is gone (see [`detect`]).
//!
//! # RAII Guards
//!
//! A claimed lock is owned by a [`LockGuard`] that removes the directory when
//! dropped. If removal fails during drop, a warning is logged but the
//! program does not crash.

mod guard;
mod operations;
mod record;
mod stale;
mod types;

#[cfg(test)]
mod tests;

// Re-export public API
pub use guard::LockGuard;
pub use operations::{
    INFO_FILE, claim, info_path, inspect, read_record, release, release_lenient, release_with,
    try_claim, write_record,
};
pub use record::{LockRecord, ParseRecordError};
pub use stale::{Detection, assess, detect, status};
pub use types::{Assessment, Claim, LockInfo, LockStatus, Location, ReleaseMode, StaleReason};
