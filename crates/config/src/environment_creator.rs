//! Consistently named environment variables from configuration values.
//!
//! Responsibilities:
//! - Map a single scalar configuration value to a prefixed, upper-cased variable.
//! - Flatten a whole configuration subtree into one variable per scalar leaf.
//! - Reject keys that two distinct configuration paths would both produce.
//!
//! Does NOT handle:
//! - Deciding which subtrees to export (see the loaders).
//! - The actual side effect (delegated to an `EnvironmentWriter`).
//!
//! Invariants:
//! - Missing paths and non-scalar values are skipped without side effects.
//! - Within one creator, a key is owned by the first configuration path that
//!   produced it; later writes from another path are rejected and recorded.
//! - Upper-casing is ASCII-only.

use std::collections::HashMap;

use serde_json::Value;

use crate::env_writer::EnvironmentWriter;
use crate::store::ConfigStore;
use crate::tree::{self, ConfigTree, PATH_DELIMITER};

/// Separator used between path components in variable names.
pub const ENV_DELIMITER: &str = "_";

/// Two configuration paths that map to the same variable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvKeyCollision {
    /// The variable name both paths produce.
    pub key: String,
    /// The path whose value was written.
    pub kept: String,
    /// The path whose value was rejected.
    pub rejected: String,
}

/// Writes prefixed environment variables through an `EnvironmentWriter`.
///
/// Loaders create one creator per load and hold it by composition.
pub struct EnvironmentCreator<'w> {
    prefix: String,
    writer: &'w mut dyn EnvironmentWriter,
    origins: HashMap<String, String>,
    collisions: Vec<EnvKeyCollision>,
}

impl<'w> EnvironmentCreator<'w> {
    /// Create a creator whose variables all start with `prefix`.
    ///
    /// The prefix should end with a separator such as `_`.
    pub fn new(prefix: impl Into<String>, writer: &'w mut dyn EnvironmentWriter) -> Self {
        Self {
            prefix: prefix.into(),
            writer,
            origins: HashMap::new(),
            collisions: Vec::new(),
        }
    }

    /// Collisions rejected so far.
    pub fn collisions(&self) -> &[EnvKeyCollision] {
        &self.collisions
    }

    /// Number of distinct variables written so far.
    pub fn written(&self) -> usize {
        self.origins.len()
    }

    /// Final variable name for `key`: prefix prepended, upper-cased.
    pub fn env_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key).to_ascii_uppercase()
    }

    /// Resolve `config_path` in `config` and export it as `env_key`.
    ///
    /// Returns the final variable name, or `None` if the path is missing, the
    /// value is not a scalar, or the key was rejected.
    pub fn map_config_to_environment(
        &mut self,
        config: &ConfigTree,
        config_path: &str,
        env_key: &str,
    ) -> Option<String> {
        let value = tree::value_by_path(config, config_path)?;
        let value = tree::scalar_string(value)?;

        self.write(env_key, &value, config_path)
    }

    /// Write a single prefixed variable.
    pub fn create_environment_variable(&mut self, key: &str, value: &str) -> Option<String> {
        self.write(key, value, key)
    }

    /// Export every scalar below `config_path` in the store.
    ///
    /// Each leaf becomes `<PREFIX><CONFIG_PATH>_<KEY>` with path separators
    /// replaced by underscores, e.g. `CMS/base/foo` becomes `PHP_CMS_BASE_FOO`.
    /// Returns the number of variables written.
    pub fn create_environment_variables(&mut self, store: &ConfigStore, config_path: &str) -> usize {
        let Some(config) = store.value_by_path(config_path) else {
            tracing::debug!(config_path, "Configuration path not available, skipping");
            return 0;
        };

        if !tree::is_iterable(config) {
            tracing::debug!(config_path, "Configuration path is not iterable, skipping");
            return 0;
        }

        self.flatten(config, config_path)
    }

    fn flatten(&mut self, config: &Value, config_path: &str) -> usize {
        let mut written = 0;

        for (key, value) in tree::entries(config) {
            let path = format!("{config_path}{PATH_DELIMITER}{key}");

            if tree::is_iterable(value) {
                written += self.flatten(value, &path);
            } else if let Some(value) = tree::scalar_string(value) {
                let env_key = format!(
                    "{}{ENV_DELIMITER}{key}",
                    config_path.replace(PATH_DELIMITER, ENV_DELIMITER)
                );
                if self.write(&env_key, &value, &path).is_some() {
                    written += 1;
                }
            }
        }

        written
    }

    fn write(&mut self, key: &str, value: &str, origin: &str) -> Option<String> {
        let key = self.env_key(key);

        if key.is_empty() || key.contains(['=', '\0']) || value.contains('\0') {
            tracing::debug!(key = %key, origin, "Skipping value that cannot be stored in the environment");
            return None;
        }

        if let Some(kept) = self.origins.get(&key)
            && kept != origin
        {
            tracing::warn!(
                key = %key,
                kept = %kept,
                rejected = origin,
                "Distinct configuration paths map to the same environment variable; keeping the first"
            );
            self.collisions.push(EnvKeyCollision {
                key,
                kept: kept.clone(),
                rejected: origin.to_string(),
            });
            return None;
        }

        self.writer.set(&key, value);
        self.origins.insert(key.clone(), origin.to_string());

        Some(key)
    }
}
