//! Shared test utilities for typo3-config integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory that prevents dotenv loading.
//! - Provide a temporary project directory with helpers to write sources.
//!
//! Invariants / Assumptions:
//! - All integration tests using this helper will be hermetic by default.
//! - Host `TYPO3*` variables and loader settings never leak into the child.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Variables read by the loader that are not `TYPO3`-prefixed.
const LOADER_VARS: &[&str] = &["ENV_FILE_PATH", "CONTEXT_CONFIGURATION_PATH", "RUST_LOG"];

/// Returns a hermetic `typo3-config` command for integration testing.
///
/// It ensures:
/// - `DOTENV_DISABLED=1` is set to prevent local `.env` contamination.
/// - Host `TYPO3*` and loader variables are cleared.
pub fn typo3_config_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("typo3-config");

    // Hermeticity: prevent loading local .env
    cmd.env("DOTENV_DISABLED", "1");

    for (key, _) in std::env::vars_os() {
        if key.to_string_lossy().starts_with("TYPO3") {
            cmd.env_remove(&key);
        }
    }
    for key in LOADER_VARS {
        cmd.env_remove(key);
    }

    cmd
}

/// Temporary TYPO3 project root.
pub struct Project {
    dir: TempDir,
}

#[allow(dead_code)]
impl Project {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the project root, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Write `app/config/environment/<context>.yaml`.
    pub fn write_context(&self, context: &str, content: &str) -> PathBuf {
        self.write(&format!("app/config/environment/{context}.yaml"), content)
    }

    /// Hermetic command running inside this project.
    pub fn cmd(&self) -> Command {
        let mut cmd = typo3_config_cmd();
        cmd.current_dir(self.path())
            .env("TYPO3_PATH_APP", self.path());
        cmd
    }
}
