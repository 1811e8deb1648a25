//! Error types for configuration loading.
//!
//! Responsibilities:
//! - Define error variants for configuration sources, the cache and bootstrap.
//!
//! Does NOT handle:
//! - Soft conditions. Missing paths, non-scalar values and absent optional
//!   files are not errors; they are reported as `None` or skipped.
//!
//! Invariants:
//! - All error variants include context for debugging (paths, variable names).
//! - Dotenv errors NEVER include raw .env line contents to prevent secret leakage.

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid application context '{context}': {message}")]
    InvalidContext { context: String, message: String },

    #[error("Unable to determine project path: {0}")]
    ProjectPathUnavailable(#[source] std::io::Error),

    #[error("Failed to read configuration source at {path}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration source at {path}: {message}")]
    SourceParse { path: PathBuf, message: String },

    #[error("Unsupported configuration file format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to read cached configuration at {path}")]
    CacheRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write cached configuration at {path}")]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Failed to parse the `.env` file due to invalid syntax.
    ///
    /// SAFETY: This error only includes the byte index of the parse failure,
    /// NOT the offending line content, to prevent leaking secrets.
    #[error(
        "Failed to parse .env file at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip .env loading"
    )]
    DotenvParse { error_index: usize },

    /// Failed to read the `.env` file due to an I/O error.
    #[error("Failed to read .env file: {kind}")]
    DotenvIo { kind: ErrorKind },

    #[error("Failed to load .env file. Hint: set DOTENV_DISABLED=1 to skip .env loading")]
    DotenvUnknown,
}
