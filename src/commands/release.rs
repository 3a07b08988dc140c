//! Implementation of the `highlander release` command.

use crate::cli::ReleaseArgs;
use highlander::config::Config;
use highlander::error::{HighlanderError, Result};
use highlander::exit_codes;
use highlander::locks::{self, LockStatus};
use highlander::{ProcessTable, SystemProcesses};
use std::path::Path;
use tracing::warn;

/// Remove the lock directory.
pub fn cmd_release(args: ReleaseArgs, config: &Config) -> Result<i32> {
    let lock_dir = config.resolve_lock_dir(args.lock.lock_dir.as_deref())?;
    release_lock(&lock_dir, args.force, &SystemProcesses)
}

/// Remove the lock at `lock_dir`, refusing a live holder unless `force` is set.
fn release_lock<P: ProcessTable>(lock_dir: &Path, force: bool, processes: &P) -> Result<i32> {
    match locks::status(lock_dir, processes)? {
        LockStatus::Free => {
            println!("No lock held at {}.", lock_dir.display());
        }
        LockStatus::Held(info) if !force => {
            return Err(HighlanderError::UserError(format!(
                "refusing to release lock held by live process {}.\n\n\
                 Releasing it lets a second instance start while the first is still running.\n\n\
                 To release the lock anyway, run:\n  highlander release --lock-dir '{}' --force",
                info.record.pid,
                lock_dir.display()
            )));
        }
        LockStatus::Held(info) => {
            warn!(pid = info.record.pid, lock = %lock_dir.display(), "releasing lock of live holder");
            locks::release(lock_dir)?;
            println!("Released lock: {}", info);
        }
        LockStatus::Stale { path, reason, .. } => {
            locks::release(&path)?;
            println!("Removed stale lock: {} ({})", path.display(), reason);
        }
    }
    Ok(exit_codes::SUCCESS)
}
