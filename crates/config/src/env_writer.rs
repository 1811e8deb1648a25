//! Environment variable output port.
//!
//! Responsibilities:
//! - Define the `EnvironmentWriter` capability through which loaders emit variables.
//! - Provide a writer for the real process environment and an in-memory one.
//!
//! Does NOT handle:
//! - Key naming, prefixing or collision checks (see `environment_creator`).
//!
//! Invariants:
//! - This is the only module that mutates the process environment.
//! - Callers pass keys that are non-empty and contain neither `=` nor NUL,
//!   and values without NUL (enforced by `EnvironmentCreator`).

use std::collections::BTreeMap;

/// A sink for environment variables produced by configuration loaders.
pub trait EnvironmentWriter {
    /// Set `key` to `value`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str);
}

/// Writes variables into the environment of the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl EnvironmentWriter for ProcessEnvironment {
    fn set(&mut self, key: &str, value: &str) {
        // SAFETY: loaders run during single-threaded bootstrap, before any
        // other thread reads the environment.
        unsafe {
            std::env::set_var(key, value);
        }
    }
}

/// Collects variables in memory, sorted by key.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingEnvironment {
    vars: BTreeMap<String, String>,
}

impl RecordingEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    pub fn into_vars(self) -> BTreeMap<String, String> {
        self.vars
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl EnvironmentWriter for RecordingEnvironment {
    fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }
}
