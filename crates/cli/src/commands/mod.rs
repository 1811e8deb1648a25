//! CLI command implementations.
//!
//! Every command runs the same loader pipeline into an in-memory environment;
//! only `exec` hands the result to another process.

pub mod env;
pub mod exec;
pub mod show;

use anyhow::{Context, Result};
use typo3_config_loader::{
    ConfigStore, ConfigurationLoader, Environment, RecordingEnvironment, SolrConfigurationLoader,
    SystemConfigurationLoader,
};

/// Which loaders run and whether the cache is used.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub cached: bool,
    pub solr: bool,
}

/// Result of running the loaders.
#[derive(Debug)]
pub struct Loaded {
    pub store: ConfigStore,
    pub vars: RecordingEnvironment,
}

/// Run the system loader, then the Solr loader unless disabled.
pub fn load(environment: Environment, options: LoadOptions) -> Result<Loaded> {
    let mut store = ConfigStore::new();
    let mut vars = RecordingEnvironment::new();

    let system = SystemConfigurationLoader::new(environment);
    let loaded = if options.cached {
        system.load_cached(&mut store, &mut vars)
    } else {
        system.load(&mut store, &mut vars)
    };
    loaded.context("Failed to load system configuration")?;

    if options.solr {
        SolrConfigurationLoader::new()
            .load(&mut store, &mut vars)
            .context("Failed to load Solr configuration")?;
    }

    tracing::debug!(variables = vars.len(), "Configuration loaders finished");

    Ok(Loaded { store, vars })
}
