//! Configuration loaders.
//!
//! Responsibilities:
//! - Define the `ConfigurationLoader` capability run during bootstrap.
//! - Load layered system configuration into the store and export `CMS/base`.
//! - Export Solr connection settings from `CMS/solr`.
//!
//! Does NOT handle:
//! - Parsing individual sources (see `reader`).
//! - Naming and writing variables (see `environment_creator`).
//!
//! Invariants:
//! - Loaders never fail on missing or mistyped configuration; they skip it.
//! - Every variable is written through the `EnvironmentWriter` passed in.

mod error;
mod solr;
mod system;

pub use error::ConfigError;
pub use solr::SolrConfigurationLoader;
pub use system::SystemConfigurationLoader;

use crate::env_writer::EnvironmentWriter;
use crate::store::ConfigStore;

/// A unit of bootstrap work that reads the store and emits variables.
pub trait ConfigurationLoader {
    fn load(
        &self,
        store: &mut ConfigStore,
        writer: &mut dyn EnvironmentWriter,
    ) -> Result<(), ConfigError>;
}
