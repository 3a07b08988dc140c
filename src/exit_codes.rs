//! Exit code constants for the highlander CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid config)
//! - 2: Lock failure (claim, record, or release error)
//! - 3: Process failure (process table query or child spawn)
//!
//! `highlander run` passes the child's own exit code through, and a skipped
//! run exits with the configured `skipped_exit_code`. `highlander status`
//! exits with [`NOT_HELD`] when no live process holds the lock.

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// Lock failure: the lock directory or its record could not be handled.
pub const LOCK_FAILURE: i32 = 2;

/// Process failure: the process table could not be queried or the child
/// program could not be started.
pub const PROCESS_FAILURE: i32 = 3;

/// `status` found the lock free or stale. Shares its value with [`USER_ERROR`]
/// so scripts can test `status` with a plain success check.
pub const NOT_HELD: i32 = 1;

/// Offset added to a signal number when a child is killed by a signal.
pub const SIGNAL_BASE: i32 = 128;
