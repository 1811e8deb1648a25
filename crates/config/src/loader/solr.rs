//! Solr connection settings as environment variables.
//!
//! ```yaml
//! CMS:
//!   solr:
//!     scheme: http
//!     host: localhost
//!     port: 8983
//!     path_read: /solr/
//!     path:
//!       1:
//!         de: core_de
//! ```
//!
//! yields `PHP_SOLR_SCHEME_READ=http`, `PHP_SOLR_HOST_READ=localhost`,
//! `PHP_SOLR_PORT_READ=8983`, `PHP_SOLR_PATH_READ=/solr/` and
//! `PHP_SOLR_CORE_READ_1_DE=core_de`.

use serde_json::Value;

use super::{ConfigError, ConfigurationLoader};
use crate::constants::{SOLR_CONFIG_PATH, SOLR_ENV_PREFIX};
use crate::env_writer::EnvironmentWriter;
use crate::environment_creator::EnvironmentCreator;
use crate::store::ConfigStore;
use crate::tree::{self, ConfigTree};

/// Configuration key to variable suffix.
const CONNECTION_MAPPING: &[(&str, &str)] = &[
    ("scheme", "SCHEME_READ"),
    ("host", "HOST_READ"),
    ("port", "PORT_READ"),
    ("path_read", "PATH_READ"),
];

/// Key of the per-site, per-language core paths.
const CORE_PATHS_KEY: &str = "path";

#[derive(Debug, Default, Clone, Copy)]
pub struct SolrConfigurationLoader;

impl SolrConfigurationLoader {
    pub fn new() -> Self {
        Self
    }

    /// Export the connection and core settings found below `CMS/solr`.
    ///
    /// Returns the number of variables written.
    pub fn export(&self, store: &ConfigStore, writer: &mut dyn EnvironmentWriter) -> usize {
        let Some(solr_config) = store.value_by_path(SOLR_CONFIG_PATH).and_then(as_tree) else {
            tracing::debug!(path = SOLR_CONFIG_PATH, "No Solr configuration, skipping");
            return 0;
        };

        let mut creator = EnvironmentCreator::new(SOLR_ENV_PREFIX, writer);
        let mut written = 0;

        for (config_key, env_key) in CONNECTION_MAPPING {
            if creator
                .map_config_to_environment(&solr_config, config_key, env_key)
                .is_some()
            {
                written += 1;
            }
        }

        if let Some(sites) = solr_config.get(CORE_PATHS_KEY) {
            for (site, languages) in tree::entries(sites) {
                for (language, _) in tree::entries(languages) {
                    let env_key = format!("CORE_READ_{site}_{}", language.to_ascii_uppercase());
                    let config_path = format!("{CORE_PATHS_KEY}/{site}/{language}");
                    if creator
                        .map_config_to_environment(&solr_config, &config_path, &env_key)
                        .is_some()
                    {
                        written += 1;
                    }
                }
            }
        }

        tracing::info!(written, "Solr configuration loaded");

        written
    }
}

impl ConfigurationLoader for SolrConfigurationLoader {
    fn load(
        &self,
        store: &mut ConfigStore,
        writer: &mut dyn EnvironmentWriter,
    ) -> Result<(), ConfigError> {
        self.export(store, writer);
        Ok(())
    }
}

/// Mappings as-is; arrays keyed by index.
fn as_tree(value: &Value) -> Option<ConfigTree> {
    match value {
        Value::Object(map) => Some(map.clone()),
        Value::Array(_) => Some(
            tree::entries(value)
                .into_iter()
                .map(|(key, value)| (key, value.clone()))
                .collect(),
        ),
        _ => None,
    }
}
