//! `exec`: run a program with the derived variables in its environment.
//!
//! The variables are handed to the child process only; the environment of
//! this process is not modified.

use std::process::{Command, ExitStatus};

use anyhow::{Result, bail};
use typo3_config_loader::Environment;

use super::{LoadOptions, load};
use crate::error::{CliError, ExitCode};

/// Run `command` and return its exit code.
pub fn run(environment: Environment, options: LoadOptions, command: &[String]) -> Result<i32> {
    let Some((program, args)) = command.split_first() else {
        bail!("No command given");
    };

    let loaded = load(environment, options)?;

    tracing::debug!(program = %program, variables = loaded.vars.len(), "Running command");

    let status = Command::new(program)
        .args(args)
        .envs(loaded.vars.vars())
        .status()
        .map_err(|source| CliError::Spawn {
            program: program.clone(),
            source,
        })?;

    Ok(exit_code_of(status))
}

/// Exit code of a finished child; signals map to `128 + signal` on Unix.
fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    ExitCode::GeneralError.as_i32()
}
