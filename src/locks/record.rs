//! Holder record codec.
//!
//! A record is written as `"<pid> <start_time>"`: the pid as a decimal
//! integer, whitespace, and the start time in seconds with exactly six
//! fractional digits. Decoding is strict. Anything other than exactly two
//! whitespace-separated numeric tokens is rejected.

use crate::process::{Pid, recorded_start_time, same_start_time};
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identity of the process holding a lock.
#[derive(Debug, Clone, Copy)]
pub struct LockRecord {
    /// Process identifier of the holder.
    pub pid: Pid,

    /// Start time of the holder, in seconds since the Unix epoch.
    pub start_time: f64,
}

/// Why a record failed to decode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseRecordError {
    #[error("record is empty")]
    Empty,

    #[error("expected 2 fields, found {0}")]
    FieldCount(usize),

    #[error("invalid process id '{0}'")]
    Pid(String),

    #[error("invalid start time '{0}'")]
    StartTime(String),
}

impl LockRecord {
    pub fn new(pid: Pid, start_time: f64) -> Self {
        Self { pid, start_time }
    }

    /// Serialize the record into its on-disk form.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Whether `other` names the same process lifetime.
    pub fn same_holder(&self, other: &LockRecord) -> bool {
        self.pid == other.pid && same_start_time(self.start_time, other.start_time)
    }

    /// The holder's start time as a UTC timestamp, if representable.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        let micros = (self.start_time * 1_000_000.0).round();
        if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
            return None;
        }
        DateTime::from_timestamp_micros(micros as i64)
    }
}

/// Records are equal when they name the same process lifetime, that is when
/// their encoded forms are identical. This makes equality an equivalence.
impl PartialEq for LockRecord {
    fn eq(&self, other: &Self) -> bool {
        self.same_holder(other)
    }
}

impl Eq for LockRecord {}

impl fmt::Display for LockRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.pid, recorded_start_time(self.start_time))
    }
}

impl FromStr for LockRecord {
    type Err = ParseRecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        let [pid, start_time] = fields.as_slice() else {
            return Err(match fields.len() {
                0 => ParseRecordError::Empty,
                n => ParseRecordError::FieldCount(n),
            });
        };

        let pid = pid
            .parse::<Pid>()
            .map_err(|_| ParseRecordError::Pid(pid.to_string()))?;
        let start_time = start_time
            .parse::<f64>()
            .ok()
            .filter(|t| t.is_finite())
            .ok_or_else(|| ParseRecordError::StartTime(start_time.to_string()))?;

        Ok(Self { pid, start_time })
    }
}
