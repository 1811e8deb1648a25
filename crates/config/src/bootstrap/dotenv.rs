//! `.env` file loading for command-line bootstrap.
//!
//! Invariants:
//! - `DOTENV_DISABLED` set to `1` or `true` skips loading entirely.
//! - A missing `.env` file is not an error.
//! - Errors never carry raw `.env` content.

use crate::constants::DOTENV_DISABLED_VAR;
use crate::loader::ConfigError;

/// Check if dotenv loading is disabled via environment variable.
fn dotenv_disabled() -> bool {
    matches!(
        std::env::var(DOTENV_DISABLED_VAR).ok().as_deref(),
        Some("true") | Some("1")
    )
}

/// Load variables from a `.env` file in the current directory or its parents.
///
/// Variables already present in the process environment are not overridden.
pub fn load_dotenv() -> Result<(), ConfigError> {
    if dotenv_disabled() {
        return Ok(());
    }

    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Loaded .env file");
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(dotenvy::Error::LineParse(_, idx)) => Err(ConfigError::DotenvParse { error_index: idx }),
        Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
            kind: io_err.kind(),
        }),
        Err(_) => Err(ConfigError::DotenvUnknown),
    }
}
