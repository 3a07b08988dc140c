//! Process identity source.
//!
//! The lock protocol only needs four questions answered about the host's
//! process table: who am I, when did I start, does process N exist, and when
//! did process N start. [`ProcessTable`] is that seam; [`SystemProcesses`]
//! answers it from the running kernel, and tests substitute a fake.
//!
//! Start times are seconds since the Unix epoch. Because the lock record keeps
//! microsecond precision, start times are compared with [`same_start_time`]
//! on their recorded decimal form rather than with `==` on the raw floats.

mod system;

pub use system::SystemProcesses;

use crate::error::Result;

/// A process identifier as recorded in a lock.
///
/// Wider than any platform pid so that out-of-range values read from disk are
/// representable (and simply never exist).
pub type Pid = i64;

/// Read access to the host's process table.
pub trait ProcessTable {
    /// Identifier of the calling process.
    fn current_pid(&self) -> Pid;

    /// Start time of the calling process.
    fn current_start_time(&self) -> Result<f64>;

    /// Whether a process with this identifier currently exists.
    fn exists(&self, pid: Pid) -> Result<bool>;

    /// Start time of the given process, or `None` if it does not exist.
    fn start_time(&self, pid: Pid) -> Result<Option<f64>>;
}

impl<P: ProcessTable + ?Sized> ProcessTable for &P {
    fn current_pid(&self) -> Pid {
        (**self).current_pid()
    }

    fn current_start_time(&self) -> Result<f64> {
        (**self).current_start_time()
    }

    fn exists(&self, pid: Pid) -> Result<bool> {
        (**self).exists(pid)
    }

    fn start_time(&self, pid: Pid) -> Result<Option<f64>> {
        (**self).start_time(pid)
    }
}

/// A start time as a lock record stores it: seconds with six fractional digits.
pub fn recorded_start_time(secs: f64) -> String {
    format!("{secs:.6}")
}

/// Compare two start times at the precision a lock record preserves.
///
/// Both sides go through [`recorded_start_time`], so a start time always
/// matches the value decoded from its own record.
pub fn same_start_time(a: f64, b: f64) -> bool {
    recorded_start_time(a) == recorded_start_time(b)
}
