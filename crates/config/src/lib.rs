//! Layered configuration loading for TYPO3 projects.
//!
//! This crate merges configuration from a context-specific file, a global env
//! file and `TYPO3__` environment variables, and exports selected subtrees as
//! `PHP_*` environment variables for the hosting application.

pub mod bootstrap;
pub mod cache;
pub mod constants;
pub mod env_writer;
pub mod environment_creator;
mod loader;
pub mod reader;
pub mod store;
pub mod tree;

pub use bootstrap::{ApplicationContext, Environment, RootContext, load_dotenv};
pub use cache::CachedConfiguration;
pub use env_writer::{EnvironmentWriter, ProcessEnvironment, RecordingEnvironment};
pub use environment_creator::{EnvKeyCollision, EnvironmentCreator};
pub use loader::{
    ConfigError, ConfigurationLoader, SolrConfigurationLoader, SystemConfigurationLoader,
};
pub use reader::{
    ConfigReader, ContextFileReader, EnvironmentReader, ReaderSet, SeparatorMode, YamlFileReader,
};
pub use store::ConfigStore;
pub use tree::ConfigTree;
