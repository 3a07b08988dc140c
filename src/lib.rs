//! Highlander: there can be only one.
//!
//! Runs a unit of work on at most one process per host at a time, using a
//! lock directory on the local filesystem as the only shared state. Locks
//! abandoned by crashed or killed holders are detected and reclaimed, and a
//! recycled pid is never mistaken for the original holder.
//!
//! ```no_run
//! use highlander::{SingleInstance, guard_at};
//!
//! // Skipped (Ok(None)) while another live process holds /tmp/report.lock.
//! let rows = guard_at("/tmp/report.lock", || 42)?;
//!
//! // The same, with the lock kept while a longer section runs.
//! let job = SingleInstance::new("/tmp/report.lock");
//! if let Some(_lock) = job.acquire()? {
//!     // ...
//! }
//! # Ok::<(), highlander::HighlanderError>(())
//! ```

pub mod config;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod instance;
pub mod locks;
pub mod logging;
pub mod process;

#[cfg(test)]
mod test_support;

pub use error::{HighlanderError, Result};
pub use instance::{SingleInstance, default_lock_dir, guard, guard_at};
pub use locks::{LockGuard, LockRecord, LockStatus};
pub use process::{ProcessTable, SystemProcesses};
