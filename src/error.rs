//! Error types for highlander.
//!
//! Uses thiserror for derive macros. Every variant carries the lock path (or
//! process id) it concerns so a fatal condition can be diagnosed from a single
//! message.

use crate::exit_codes;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for highlander operations.
///
/// Losing a claim race is not an error: it is reported through
/// [`crate::locks::Claim::AlreadyHeld`].
#[derive(Error, Debug)]
pub enum HighlanderError {
    /// The holder record is missing, unreadable, or malformed.
    #[error("invalid lock record at '{}': {reason}", path.display())]
    InvalidRecord { path: PathBuf, reason: String },

    /// A holder record was already present when a new one was written.
    #[error("lock record already exists at '{}'", path.display())]
    RecordAlreadyExists { path: PathBuf },

    /// The lock path is absent or is not a directory.
    #[error("invalid lock location '{}': not an existing directory", path.display())]
    InvalidLockLocation { path: PathBuf },

    /// Creating the lock directory failed for a reason other than contention.
    #[error("failed to claim lock '{}': {source}", path.display())]
    Claim {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Any other filesystem failure.
    #[error("failed to {action} '{}': {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The process table could not be queried.
    #[error("failed to query process {pid}: {reason}")]
    ProcessQuery { pid: i64, reason: String },

    /// Configuration could not be loaded or is invalid.
    #[error("{0}")]
    Config(String),

    /// The request was refused; the message says how to proceed.
    #[error("{0}")]
    UserError(String),

    /// The guarded child program could not be started.
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl HighlanderError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            HighlanderError::Config(_) | HighlanderError::UserError(_) => {
                exit_codes::USER_ERROR
            }
            HighlanderError::InvalidRecord { .. }
            | HighlanderError::RecordAlreadyExists { .. }
            | HighlanderError::InvalidLockLocation { .. }
            | HighlanderError::Claim { .. }
            | HighlanderError::Io { .. } => exit_codes::LOCK_FAILURE,
            HighlanderError::ProcessQuery { .. } | HighlanderError::Spawn { .. } => {
                exit_codes::PROCESS_FAILURE
            }
        }
    }

    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        HighlanderError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for highlander operations.
pub type Result<T> = std::result::Result<T, HighlanderError>;
