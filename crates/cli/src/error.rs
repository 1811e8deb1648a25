//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map library and CLI errors to exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//! - Exit codes of programs run by `exec`, which are passed through unchanged.

use thiserror::Error;
use typo3_config_loader::ConfigError;

/// Structured exit codes for typo3-config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success - command completed successfully.
    Success = 0,

    /// General error - unhandled or generic failure.
    GeneralError = 1,

    /// Configuration error - invalid context, unreadable or malformed sources,
    /// cache I/O failure.
    ///
    /// Scripts should fix the deployment and not retry.
    ConfigError = 2,

    /// The program given to `exec` could not be started.
    SpawnFailed = 3,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

/// Errors raised by the CLI itself.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to run '{program}'")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Extract the appropriate exit code from this error.
    ///
    /// Returns ExitCode::GeneralError if no known error is in the chain.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if cause.downcast_ref::<ConfigError>().is_some() {
                return ExitCode::ConfigError;
            }
            if let Some(CliError::Spawn { .. }) = cause.downcast_ref::<CliError>() {
                return ExitCode::SpawnFailed;
            }
        }

        ExitCode::GeneralError
    }
}
