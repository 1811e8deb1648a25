//! Runtime environment of the hosting application.
//!
//! Responsibilities:
//! - Hold the application context, project path and var path.
//! - Detect whether the process runs interactively.
//! - Build all of the above from `TYPO3_CONTEXT` and `TYPO3_PATH_APP`, or
//!   from the same settings passed explicitly.
//!
//! Does NOT handle:
//! - Locating configuration files (see `loader::system`).
//!
//! Invariants:
//! - The var path defaults to `<project>/var`.
//! - Empty or whitespace-only settings are treated as unset.
//! - The project path is absolute.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use super::context::ApplicationContext;
use crate::constants::{APPLICATION_CONTEXT_VAR, PROJECT_PATH_VAR, VAR_DIR};
use crate::loader::ConfigError;
use crate::reader::env_var_or_none;

/// Where and how the application runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    context: ApplicationContext,
    project_path: PathBuf,
    var_path: PathBuf,
    interactive: bool,
}

impl Environment {
    /// Create an environment for `project_path` with the default var path.
    ///
    /// The process is assumed to be non-interactive.
    pub fn new(context: ApplicationContext, project_path: impl Into<PathBuf>) -> Self {
        let project_path = project_path.into();
        let var_path = project_path.join(VAR_DIR);
        Self {
            context,
            project_path,
            var_path,
            interactive: false,
        }
    }

    /// Build the environment from process variables.
    ///
    /// - `TYPO3_CONTEXT` selects the application context (default `Production`).
    /// - `TYPO3_PATH_APP` selects the project path (default: current directory).
    pub fn from_env() -> Result<Self, ConfigError> {
        let context = env_var_or_none(APPLICATION_CONTEXT_VAR);
        let project_path = env_var_or_none(PROJECT_PATH_VAR).map(PathBuf::from);

        Self::resolve(context.as_deref(), project_path.as_deref())
    }

    /// Build the environment from explicit settings, e.g. command-line flags.
    ///
    /// Blank values fall back to the defaults. A relative project path is
    /// resolved against the current directory. Interactivity follows stdin.
    pub fn resolve(context: Option<&str>, project_path: Option<&Path>) -> Result<Self, ConfigError> {
        let context = match context.map(str::trim) {
            Some(context) if !context.is_empty() => ApplicationContext::parse(context)?,
            _ => ApplicationContext::default(),
        };

        let project_path = match project_path.filter(|path| !is_blank(path)) {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => current_dir()?.join(path),
            None => current_dir()?,
        };

        Ok(Self::new(context, project_path).with_interactive(std::io::stdin().is_terminal()))
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn context(&self) -> &ApplicationContext {
        &self.context
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    pub fn var_path(&self) -> &Path {
        &self.var_path
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }
}

fn current_dir() -> Result<PathBuf, ConfigError> {
    std::env::current_dir().map_err(ConfigError::ProjectPathUnavailable)
}

fn is_blank(path: &Path) -> bool {
    path.to_str().is_some_and(|s| s.trim().is_empty())
}
