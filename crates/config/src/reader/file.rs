//! File-backed configuration readers.
//!
//! Responsibilities:
//! - Locate the context-specific configuration file for an application context.
//! - Read the global env file.
//! - Parse YAML and JSON documents into configuration trees.
//!
//! Invariants:
//! - A missing file means "no configuration", never an error.
//! - A present file that fails to parse is an error.
//! - An empty document is an empty tree; any other non-mapping root is an error.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::ConfigReader;
use crate::bootstrap::ApplicationContext;
use crate::constants::CONTEXT_FILE_EXTENSIONS;
use crate::loader::ConfigError;
use crate::tree::{self, ConfigTree};

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    /// Detect the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(FileFormat::Yaml),
            "json" => Some(FileFormat::Json),
            _ => None,
        }
    }

    /// Parse `content`; `path` is only used for error reporting.
    pub fn parse(self, content: &str, path: &Path) -> Result<ConfigTree, ConfigError> {
        let parse_error = |message: String| ConfigError::SourceParse {
            path: path.to_path_buf(),
            message,
        };

        let value = match self {
            FileFormat::Yaml => {
                let raw: serde_yaml::Value =
                    serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
                tree::value_from_yaml(raw)
            }
            FileFormat::Json => {
                serde_json::from_str::<Value>(content).map_err(|e| parse_error(e.to_string()))?
            }
        };

        match value {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(ConfigTree::new()),
            _ => Err(parse_error(
                "top-level value must be a mapping".to_string(),
            )),
        }
    }
}

fn read_tree_file(path: &Path, format: FileFormat) -> Result<ConfigTree, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::SourceRead {
        path: path.to_path_buf(),
        source,
    })?;

    format.parse(&content, path)
}

/// Reads the configuration file named after the application context.
///
/// For context `Production/Staging` and base directory
/// `app/config/environment`, the file is
/// `app/config/environment/Production/Staging.yaml` (or `.yml`, `.json`).
#[derive(Debug, Clone)]
pub struct ContextFileReader {
    path: PathBuf,
}

impl ContextFileReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Locate the context file below `base_dir`.
    ///
    /// Extensions are probed in order; if none exists the reader points at
    /// the first candidate and provides no configuration.
    pub fn locate(base_dir: &Path, context: &ApplicationContext) -> Self {
        let stem = base_dir.join(context.as_str());
        let candidates: Vec<PathBuf> = CONTEXT_FILE_EXTENSIONS
            .iter()
            .map(|ext| {
                let mut candidate = stem.clone().into_os_string();
                candidate.push(".");
                candidate.push(ext);
                PathBuf::from(candidate)
            })
            .collect();

        let path = candidates
            .iter()
            .find(|candidate| candidate.is_file())
            .or_else(|| candidates.first())
            .cloned()
            .unwrap_or(stem);

        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigReader for ContextFileReader {
    fn name(&self) -> &'static str {
        "context-file"
    }

    fn has_config(&self) -> bool {
        self.path.is_file()
    }

    fn read_config(&self) -> Result<ConfigTree, ConfigError> {
        let format = FileFormat::from_path(&self.path).ok_or_else(|| {
            ConfigError::UnsupportedFormat {
                path: self.path.clone(),
            }
        })?;

        read_tree_file(&self.path, format)
    }

    fn source_file(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Reads the global env file. The file is always parsed as YAML.
#[derive(Debug, Clone)]
pub struct YamlFileReader {
    path: PathBuf,
}

impl YamlFileReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigReader for YamlFileReader {
    fn name(&self) -> &'static str {
        "env-file"
    }

    fn has_config(&self) -> bool {
        self.path.is_file()
    }

    fn read_config(&self) -> Result<ConfigTree, ConfigError> {
        read_tree_file(&self.path, FileFormat::Yaml)
    }

    fn source_file(&self) -> Option<&Path> {
        Some(&self.path)
    }
}
