//! Process table backed by the running kernel.

use super::{Pid, ProcessTable};
use crate::error::{HighlanderError, Result};
use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid as RawPid;

/// The host's real process table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcesses;

impl ProcessTable for SystemProcesses {
    fn current_pid(&self) -> Pid {
        Pid::from(std::process::id())
    }

    fn current_start_time(&self) -> Result<f64> {
        let pid = self.current_pid();
        self.start_time(pid)?
            .ok_or_else(|| query_error(pid, "current process is missing from the process table"))
    }

    fn exists(&self, pid: Pid) -> Result<bool> {
        let Some(raw) = to_raw_pid(pid) else {
            return Ok(false);
        };

        // Signal 0 only performs the existence and permission checks.
        match kill(RawPid::from_raw(raw), None) {
            Ok(()) | Err(Errno::EPERM) => Ok(true),
            Err(Errno::ESRCH) => Ok(false),
            Err(e) => Err(query_error(pid, e.desc())),
        }
    }

    fn start_time(&self, pid: Pid) -> Result<Option<f64>> {
        if to_raw_pid(pid).is_none() {
            return Ok(None);
        }
        platform::start_time(pid)
    }
}

/// Narrow a recorded pid to one that can safely be handed to `kill(2)`.
///
/// Zero and negative values address process groups, so they never name a
/// single holder.
fn to_raw_pid(pid: Pid) -> Option<i32> {
    i32::try_from(pid).ok().filter(|raw| *raw > 0)
}

fn query_error(pid: Pid, reason: impl Into<String>) -> HighlanderError {
    HighlanderError::ProcessQuery {
        pid,
        reason: reason.into(),
    }
}

#[cfg(target_os = "linux")]
mod platform {
    use super::query_error;
    use crate::error::Result;
    use crate::process::Pid;
    use nix::unistd::{SysconfVar, sysconf};
    use std::fs;
    use std::io::ErrorKind;

    /// Start time as boot time plus the `starttime` field of `/proc/<pid>/stat`.
    pub(super) fn start_time(pid: Pid) -> Result<Option<f64>> {
        let stat_path = format!("/proc/{pid}/stat");
        let stat = match fs::read_to_string(&stat_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(query_error(pid, format!("failed to read {stat_path}: {e}")));
            }
        };

        let ticks = parse_start_ticks(&stat)
            .ok_or_else(|| query_error(pid, format!("malformed {stat_path}")))?;
        let hz = clock_ticks_per_second(pid)?;
        let boot = boot_time(pid)?;

        Ok(Some(boot + ticks as f64 / hz))
    }

    /// Extract field 22 (`starttime`) from a `/proc/<pid>/stat` line.
    pub(super) fn parse_start_ticks(stat: &str) -> Option<u64> {
        // comm (field 2) may itself contain spaces and parentheses.
        let rest = &stat[stat.rfind(')')? + 1..];
        rest.split_whitespace().nth(19)?.parse().ok()
    }

    /// Extract `btime` from `/proc/stat`.
    pub(super) fn parse_boot_time(stat: &str) -> Option<f64> {
        stat.lines()
            .find_map(|line| line.strip_prefix("btime "))
            .and_then(|value| value.trim().parse().ok())
    }

    fn boot_time(pid: Pid) -> Result<f64> {
        let stat = fs::read_to_string("/proc/stat")
            .map_err(|e| query_error(pid, format!("failed to read /proc/stat: {e}")))?;
        parse_boot_time(&stat).ok_or_else(|| query_error(pid, "no btime entry in /proc/stat"))
    }

    fn clock_ticks_per_second(pid: Pid) -> Result<f64> {
        match sysconf(SysconfVar::CLK_TCK) {
            Ok(Some(hz)) if hz > 0 => Ok(hz as f64),
            Ok(_) => Err(query_error(pid, "clock tick rate is unavailable")),
            Err(e) => Err(query_error(pid, format!("sysconf(CLK_TCK) failed: {}", e.desc()))),
        }
    }
}

#[cfg(not(target_os = "linux"))]
mod platform {
    use super::query_error;
    use crate::error::Result;
    use crate::process::Pid;

    pub(super) fn start_time(pid: Pid) -> Result<Option<f64>> {
        Err(query_error(
            pid,
            "process start times are unsupported on this platform",
        ))
    }
}
