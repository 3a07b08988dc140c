//! Command implementations for highlander.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Every command returns the process exit code on success;
//! errors are turned into exit codes by `main`.

mod release;
mod run;
mod status;

use crate::cli::Command;
use highlander::config::Config;
use highlander::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command, config: &Config) -> Result<i32> {
    match command {
        Command::Run(args) => run::cmd_run(args, config),
        Command::Status(args) => status::cmd_status(args, config),
        Command::Release(args) => release::cmd_release(args, config),
    }
}
