use crate::error::{HighlanderError, Result};
use crate::locks::info_path;
use crate::process::{Pid, ProcessTable};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// Deterministic process table: the calling "process" plus any extra
/// processes registered with [`FakeProcesses::with_process`].
#[derive(Debug, Clone)]
pub(crate) struct FakeProcesses {
    current_pid: Pid,
    current_start: f64,
    others: HashMap<Pid, f64>,
    fail_start_time: bool,
}

impl FakeProcesses {
    pub(crate) fn new(current_pid: Pid, current_start: f64) -> Self {
        Self {
            current_pid,
            current_start,
            others: HashMap::new(),
            fail_start_time: false,
        }
    }

    pub(crate) fn with_process(mut self, pid: Pid, start_time: f64) -> Self {
        self.others.insert(pid, start_time);
        self
    }

    pub(crate) fn failing_start_time(mut self) -> Self {
        self.fail_start_time = true;
        self
    }
}

impl ProcessTable for FakeProcesses {
    fn current_pid(&self) -> Pid {
        self.current_pid
    }

    fn current_start_time(&self) -> Result<f64> {
        if self.fail_start_time {
            return Err(HighlanderError::ProcessQuery {
                pid: self.current_pid,
                reason: "simulated failure".to_string(),
            });
        }
        Ok(self.current_start)
    }

    fn exists(&self, pid: Pid) -> Result<bool> {
        Ok(pid == self.current_pid || self.others.contains_key(&pid))
    }

    fn start_time(&self, pid: Pid) -> Result<Option<f64>> {
        if pid == self.current_pid {
            return self.current_start_time().map(Some);
        }
        Ok(self.others.get(&pid).copied())
    }
}

/// Create a lock directory by hand with arbitrary record content.
pub(crate) fn write_raw_record(lock_dir: &Path, content: &str) {
    std::fs::create_dir_all(lock_dir).unwrap();
    std::fs::write(info_path(lock_dir), content).unwrap();
}
