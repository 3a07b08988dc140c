//! Implementation of the `highlander status` command.
//!
//! Read-only: a stale lock is reported, never reclaimed.

use crate::cli::StatusArgs;
use highlander::config::Config;
use highlander::error::Result;
use highlander::exit_codes;
use highlander::locks::{self, LockStatus};
use highlander::SystemProcesses;
use serde_json::{Value, json};
use std::fmt::Write as _;
use std::path::Path;

/// Print who holds the lock.
///
/// Exits 0 when a live process holds the lock, 1 otherwise.
pub fn cmd_status(args: StatusArgs, config: &Config) -> Result<i32> {
    let lock_dir = config.resolve_lock_dir(args.lock.lock_dir.as_deref())?;
    let status = locks::status(&lock_dir, &SystemProcesses)?;

    if args.json {
        println!("{:#}", status_json(&lock_dir, &status));
    } else {
        print!("{}", render_status(&lock_dir, &status));
    }

    Ok(if status.is_held() {
        exit_codes::SUCCESS
    } else {
        exit_codes::NOT_HELD
    })
}

/// Human-readable report.
pub(super) fn render_status(lock_dir: &Path, status: &LockStatus) -> String {
    let mut out = String::new();
    match status {
        LockStatus::Free => {
            let _ = writeln!(out, "No lock held at {}.", lock_dir.display());
        }
        LockStatus::Held(info) => {
            let _ = writeln!(out, "Lock held:");
            let _ = writeln!(out, "  PID:        {}", info.record.pid);
            if let Some(started) = info.started_at() {
                let _ = writeln!(
                    out,
                    "  Started:    {}",
                    started.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }
            let _ = writeln!(out, "  Age:        {}", info.age_string());
            let _ = writeln!(out, "  Path:       {}", info.path.display());
        }
        LockStatus::Stale {
            path,
            reason,
            record,
        } => {
            let _ = writeln!(out, "Stale lock at {}:", path.display());
            let _ = writeln!(out, "  Reason:     {}", reason);
            if let Some(record) = record {
                let _ = writeln!(out, "  PID:        {}", record.pid);
            }
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "The next `highlander run` reclaims it; `highlander release` removes it now."
            );
        }
    }
    out
}

/// Machine-readable report.
pub(super) fn status_json(lock_dir: &Path, status: &LockStatus) -> Value {
    match status {
        LockStatus::Free => json!({
            "path": lock_dir.display().to_string(),
            "state": "free",
        }),
        LockStatus::Held(info) => json!({
            "path": info.path.display().to_string(),
            "state": "held",
            "pid": info.record.pid,
            "start_time": info.record.start_time,
            "started_at": info.started_at().map(|t| t.to_rfc3339()),
            "age": info.age_string(),
        }),
        LockStatus::Stale {
            path,
            reason,
            record,
        } => json!({
            "path": path.display().to_string(),
            "state": "stale",
            "reason": reason,
            "pid": record.map(|r| r.pid),
            "start_time": record.map(|r| r.start_time),
        }),
    }
}
