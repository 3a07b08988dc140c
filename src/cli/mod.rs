//! CLI argument parsing for highlander.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Highlander: run a command on at most one process per host.
///
/// The lock is a directory (default: `./.pid`) holding the pid and start
/// time of the process that owns it. Locks left behind by crashed or killed
/// holders are reclaimed automatically.
#[derive(Parser, Debug)]
#[command(name = "highlander")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv). `RUST_LOG` overrides this.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (default: .highlander.yaml in the working directory, if present).
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for highlander.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a program unless another instance already holds the lock.
    ///
    /// Exits with the program's exit code, or with the configured
    /// `skipped_exit_code` when another live instance holds the lock.
    Run(RunArgs),

    /// Show who holds the lock.
    ///
    /// Exits 0 when a live process holds the lock, 1 otherwise.
    Status(StatusArgs),

    /// Remove the lock directory.
    ///
    /// Refuses to remove a lock whose holder is alive unless --force is given.
    Release(ReleaseArgs),
}

/// Lock location shared by every subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct LockArgs {
    /// Lock directory (overrides `lock_dir` from the config).
    #[arg(long, value_name = "DIR")]
    pub lock_dir: Option<PathBuf>,
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub lock: LockArgs,

    /// Program to run, followed by its arguments.
    #[arg(
        value_name = "PROGRAM",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub program: Vec<OsString>,
}

/// Arguments for the `status` command.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub lock: LockArgs,

    /// Print the status as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `release` command.
#[derive(Parser, Debug)]
pub struct ReleaseArgs {
    #[command(flatten)]
    pub lock: LockArgs,

    /// Remove the lock even if its holder is still running.
    #[arg(long)]
    pub force: bool,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
