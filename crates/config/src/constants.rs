//! Centralized constants for the configuration loader.
//!
//! Variable names, default paths and prefixes live here to avoid string
//! duplication across readers, loaders and the CLI.

// =============================================================================
// Environment Variables Consumed
// =============================================================================

/// Path to the global env file (YAML).
pub const ENV_FILE_PATH_VAR: &str = "ENV_FILE_PATH";

/// Override for the context configuration directory, relative to the project path.
pub const CONTEXT_CONFIGURATION_PATH_VAR: &str = "CONTEXT_CONFIGURATION_PATH";

/// Flag selecting the environment reader delimiter.
///
/// Unset or truthy selects `__`; an explicit falsy value selects the
/// deprecated single underscore.
pub const SAFE_SEPARATOR_FLAG_VAR: &str = "TYPO3_CONFIG_LOADER_USE_SAFE_SEPARATOR";

/// Application context, e.g. `Production/Staging`.
pub const APPLICATION_CONTEXT_VAR: &str = "TYPO3_CONTEXT";

/// Project root of the hosting application.
pub const PROJECT_PATH_VAR: &str = "TYPO3_PATH_APP";

/// Disables `.env` loading when set to `1` or `true`.
pub const DOTENV_DISABLED_VAR: &str = "DOTENV_DISABLED";

/// Variables that steer the loader itself and are never read as configuration.
pub const CONTROL_VARIABLES: &[&str] = &[
    SAFE_SEPARATOR_FLAG_VAR,
    APPLICATION_CONTEXT_VAR,
    PROJECT_PATH_VAR,
];

// =============================================================================
// Sources
// =============================================================================

/// Default context configuration directory, relative to the project path.
pub const DEFAULT_CONTEXT_CONFIGURATION_PATH: &str = "app/config/environment";

/// Extensions probed for the context file, in order.
pub const CONTEXT_FILE_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Prefix of configuration variables read from the process environment.
pub const ENV_READER_PREFIX: &str = "TYPO3";

/// Delimiter between prefix and path components in safe mode.
pub const SAFE_ENV_DELIMITER: &str = "__";

/// Deprecated single-character delimiter.
pub const LEGACY_ENV_DELIMITER: &str = "_";

// =============================================================================
// Cache
// =============================================================================

/// Var directory name below the project path.
pub const VAR_DIR: &str = "var";

/// Cache location below the var path.
pub const CACHE_STORAGE_LOCATION: &str = "cache/data/typo3_config";

/// File name prefix of cache entries.
pub const CACHE_FILE_PREFIX: &str = "cached-config-";

/// File extension of cache entries.
pub const CACHE_FILE_EXTENSION: &str = "json";

// =============================================================================
// Exported Variables
// =============================================================================

/// Subtree exported by the system loader.
pub const BASE_CONFIG_PATH: &str = "CMS/base";

/// Prefix of variables exported by the system loader.
pub const SYSTEM_ENV_PREFIX: &str = "PHP_";

/// Subtree read by the Solr loader.
pub const SOLR_CONFIG_PATH: &str = "CMS/solr";

/// Prefix of variables exported by the Solr loader.
pub const SOLR_ENV_PREFIX: &str = "PHP_SOLR_";
