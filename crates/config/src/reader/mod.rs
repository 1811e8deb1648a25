//! Configuration readers and the layered reader set.
//!
//! Responsibilities:
//! - Define the `ConfigReader` capability: one source, one partial tree.
//! - Read context files, env files and prefixed environment variables.
//! - Merge an ordered list of readers into a single tree.
//!
//! Does NOT handle:
//! - Deciding which readers exist (see `loader::system`).
//! - Applying the merged tree to a store or exporting variables.
//!
//! Invariants:
//! - Later readers override earlier ones per leaf path; mappings merge recursively.
//! - A reader without configuration contributes nothing and is not an error.

mod env;
mod file;

use std::fmt;
use std::path::Path;

use crate::loader::ConfigError;
use crate::tree::{self, ConfigTree};

pub use env::{EnvironmentReader, SeparatorMode, env_var_or_none, legacy_warning_applies};
pub use file::{ContextFileReader, FileFormat, YamlFileReader};

pub(crate) use env::deprecate_legacy_separator;

/// A single configuration source.
pub trait ConfigReader: fmt::Debug {
    /// Short human-readable name used in logs.
    fn name(&self) -> &'static str;

    /// Returns true if the source currently provides configuration.
    fn has_config(&self) -> bool;

    /// Read the source into a tree.
    fn read_config(&self) -> Result<ConfigTree, ConfigError>;

    /// File backing this reader, if any. Used to derive cache identifiers.
    fn source_file(&self) -> Option<&Path> {
        None
    }
}

/// Ordered readers; later entries win.
#[derive(Debug, Default)]
pub struct ReaderSet {
    readers: Vec<Box<dyn ConfigReader>>,
}

impl ReaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reader with the highest precedence so far.
    pub fn push(&mut self, reader: impl ConfigReader + 'static) {
        self.readers.push(Box::new(reader));
    }

    pub fn with(mut self, reader: impl ConfigReader + 'static) -> Self {
        self.push(reader);
        self
    }

    pub fn len(&self) -> usize {
        self.readers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn ConfigReader> {
        self.readers
            .iter()
            .map(|reader| reader.as_ref() as &dyn ConfigReader)
    }

    /// Reader names in precedence order.
    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(|reader| reader.name()).collect()
    }

    /// Files backing the readers, in precedence order. Files may not exist.
    pub fn source_files(&self) -> Vec<&Path> {
        self.iter().filter_map(|reader| reader.source_file()).collect()
    }

    /// Read every source and deep-merge the results in order.
    pub fn load(&self) -> Result<ConfigTree, ConfigError> {
        let mut merged = ConfigTree::new();

        for reader in self.iter() {
            if !reader.has_config() {
                tracing::debug!(reader = reader.name(), "Reader has no configuration, skipping");
                continue;
            }

            let data = reader.read_config()?;
            tracing::debug!(
                reader = reader.name(),
                keys = data.len(),
                "Read configuration layer"
            );
            tree::deep_merge(&mut merged, data);
        }

        Ok(merged)
    }
}
