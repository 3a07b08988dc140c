//! Highlander: run a command on at most one process per host.
//!
//! This is the main entry point for the `highlander` CLI. It parses
//! arguments, loads the config, installs logging, dispatches to the
//! appropriate command handler, and handles errors with proper exit codes.

mod cli;
mod commands;

use cli::Cli;
use highlander::config::Config;
use highlander::error::Result;
use highlander::logging::init_tracing;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(u8::MAX)),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            // Return appropriate exit code
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let cwd = std::env::current_dir().map_err(|e| {
        highlander::HighlanderError::Config(format!("cannot determine working directory: {}", e))
    })?;
    let config = Config::discover(cli.config.as_deref(), &cwd)?;
    init_tracing(cli.verbose, &config.log_level)?;

    commands::dispatch(cli.command, &config)
}
