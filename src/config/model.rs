//! Config struct definition and default implementation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".highlander.yaml";

/// Configuration for the highlander CLI.
///
/// This struct represents the contents of `.highlander.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lock directory to use when `--lock-dir` is not given.
    /// Relative paths are resolved against the working directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_dir: Option<PathBuf>,

    /// Exit code of `highlander run` when another instance holds the lock.
    #[serde(default = "default_skipped_exit_code")]
    pub skipped_exit_code: u8,

    /// Log filter used when neither `RUST_LOG` nor `-v` is given.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_skipped_exit_code() -> u8 {
    0
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lock_dir: None,
            skipped_exit_code: default_skipped_exit_code(),
            log_level: default_log_level(),
        }
    }
}
