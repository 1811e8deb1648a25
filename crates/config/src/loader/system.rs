//! System configuration loader.
//!
//! Responsibilities:
//! - Assemble the reader set: context file, env file, environment variables.
//! - Merge the result into the store, optionally through the cache.
//! - Export every scalar below `CMS/base` as a `PHP_` variable.
//!
//! Invariants:
//! - An absent or non-mapping store is left untouched, but `CMS/base` export
//!   still runs against whatever the store holds.
//! - Cache hits never invoke the readers.

use std::path::{Path, PathBuf};

use super::{ConfigError, ConfigurationLoader};
use crate::bootstrap::Environment;
use crate::cache::CachedConfiguration;
use crate::constants::{
    BASE_CONFIG_PATH, CONTEXT_CONFIGURATION_PATH_VAR, DEFAULT_CONTEXT_CONFIGURATION_PATH,
    ENV_FILE_PATH_VAR, SYSTEM_ENV_PREFIX,
};
use crate::env_writer::EnvironmentWriter;
use crate::environment_creator::EnvironmentCreator;
use crate::reader::{
    ContextFileReader, EnvironmentReader, ReaderSet, SeparatorMode, YamlFileReader,
    deprecate_legacy_separator, env_var_or_none,
};
use crate::store::ConfigStore;
use crate::tree::ConfigTree;

/// Loads the layered system configuration.
#[derive(Debug)]
pub struct SystemConfigurationLoader {
    environment: Environment,
    readers: ReaderSet,
}

impl SystemConfigurationLoader {
    /// Build the default reader set for `environment`.
    ///
    /// Reads `CONTEXT_CONFIGURATION_PATH`, `ENV_FILE_PATH` and
    /// `TYPO3_CONFIG_LOADER_USE_SAFE_SEPARATOR` from the process environment
    /// and snapshots the `TYPO3` variables.
    pub fn new(environment: Environment) -> Self {
        let base_dir = context_configuration_dir(environment.project_path());
        let mut readers =
            ReaderSet::new().with(ContextFileReader::locate(&base_dir, environment.context()));

        if let Some(env_file) = env_var_or_none(ENV_FILE_PATH_VAR) {
            readers.push(YamlFileReader::new(env_file));
        }

        let mode = SeparatorMode::from_env();
        if mode == SeparatorMode::Legacy {
            deprecate_legacy_separator(&environment);
        }
        readers.push(EnvironmentReader::for_mode(mode));

        Self::with_readers(environment, readers)
    }

    /// Use an explicit reader set.
    pub fn with_readers(environment: Environment, readers: ReaderSet) -> Self {
        Self {
            environment,
            readers,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn readers(&self) -> &ReaderSet {
        &self.readers
    }

    /// Files hashed into the cache identifier, highest precedence first.
    pub fn cache_files(&self) -> Vec<&Path> {
        let mut files = self.readers.source_files();
        files.reverse();
        files
    }

    /// Cache entry for the current source files.
    pub fn cache(&self) -> Result<CachedConfiguration, ConfigError> {
        CachedConfiguration::for_files(&self.environment, &self.cache_files())
    }

    /// Read all sources, merge into the store and export `CMS/base`.
    pub fn load(
        &self,
        store: &mut ConfigStore,
        writer: &mut dyn EnvironmentWriter,
    ) -> Result<(), ConfigError> {
        let data = self.readers.load()?;
        self.process_loaded_data(store, writer, data);
        Ok(())
    }

    /// Like `load`, but reuse the merged sources from the cache when possible.
    pub fn load_cached(
        &self,
        store: &mut ConfigStore,
        writer: &mut dyn EnvironmentWriter,
    ) -> Result<(), ConfigError> {
        let data = self.cache()?.load_or_insert_with(|| self.readers.load())?;
        self.process_loaded_data(store, writer, data);
        Ok(())
    }

    fn process_loaded_data(
        &self,
        store: &mut ConfigStore,
        writer: &mut dyn EnvironmentWriter,
        data: ConfigTree,
    ) {
        if !store.merge(data) {
            tracing::debug!("Configuration store is not a mapping, skipping merge");
        }

        let mut creator = EnvironmentCreator::new(SYSTEM_ENV_PREFIX, writer);
        let written = creator.create_environment_variables(store, BASE_CONFIG_PATH);

        tracing::info!(
            context = %self.environment.context(),
            written,
            collisions = creator.collisions().len(),
            "System configuration loaded"
        );
    }
}

impl ConfigurationLoader for SystemConfigurationLoader {
    fn load(
        &self,
        store: &mut ConfigStore,
        writer: &mut dyn EnvironmentWriter,
    ) -> Result<(), ConfigError> {
        SystemConfigurationLoader::load(self, store, writer)
    }
}

/// Context configuration directory; relative overrides resolve against the project.
fn context_configuration_dir(project_path: &Path) -> PathBuf {
    let dir = env_var_or_none(CONTEXT_CONFIGURATION_PATH_VAR)
        .unwrap_or_else(|| DEFAULT_CONTEXT_CONFIGURATION_PATH.to_string());

    project_path.join(dir)
}
