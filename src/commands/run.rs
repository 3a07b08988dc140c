//! Implementation of the `highlander run` command.

use crate::cli::RunArgs;
use highlander::SingleInstance;
use highlander::config::Config;
use highlander::error::{HighlanderError, Result};
use highlander::exit_codes;
use std::os::unix::process::ExitStatusExt;
use std::process::{Command, ExitStatus};
use tracing::{debug, info};

/// Run the program under the lock.
///
/// Returns the program's exit code, or the configured `skipped_exit_code`
/// when another live instance holds the lock.
pub fn cmd_run(args: RunArgs, config: &Config) -> Result<i32> {
    let lock_dir = config.resolve_lock_dir(args.lock.lock_dir.as_deref())?;
    let Some((program, program_args)) = args.program.split_first() else {
        return Err(HighlanderError::UserError(
            "no program given.\n\nUsage: highlander run -- <PROGRAM> [ARGS...]".to_string(),
        ));
    };
    let name = program.to_string_lossy().into_owned();

    let outcome = SingleInstance::new(&lock_dir).run(|| {
        debug!(program = %name, lock = %lock_dir.display(), "starting program");
        Command::new(program).args(program_args).status()
    })?;

    match outcome {
        None => {
            info!(program = %name, lock = %lock_dir.display(), "skipped");
            Ok(i32::from(config.skipped_exit_code))
        }
        Some(Ok(status)) => Ok(exit_code_of(status)),
        Some(Err(source)) => Err(HighlanderError::Spawn {
            program: name,
            source,
        }),
    }
}

/// The exit code `highlander` reports for a finished child.
fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    match status.signal() {
        Some(signal) => exit_codes::SIGNAL_BASE + signal,
        None => exit_codes::PROCESS_FAILURE,
    }
}
