//! Content-addressed cache of merged configuration.
//!
//! Responsibilities:
//! - Derive a cache identifier from the contents of the configuration files.
//! - Return the cached tree on a hit, or compute and persist it on a miss.
//! - Move unreadable cache entries aside as `.corrupt.{timestamp}` files.
//!
//! Does NOT handle:
//! - Cache invalidation by time. Entries live until their identifier changes
//!   or the cache directory is flushed.
//!
//! Invariants:
//! - The identifier only depends on file contents, in reader order.
//! - Missing files do not contribute to the identifier.
//! - Entries are written atomically (temporary file, then rename).
//! - An entry is only used if the identifier stored inside it matches.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::bootstrap::Environment;
use crate::constants::{CACHE_FILE_EXTENSION, CACHE_FILE_PREFIX, CACHE_STORAGE_LOCATION};
use crate::loader::ConfigError;
use crate::tree::ConfigTree;

/// On-disk cache entry.
#[derive(Debug, Deserialize)]
struct StoredEntry {
    identifier: String,
    config: ConfigTree,
}

#[derive(Serialize)]
struct StoredEntryRef<'a> {
    identifier: &'a str,
    config: &'a ConfigTree,
}

/// Cache entry for one combination of configuration files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedConfiguration {
    cache_dir: PathBuf,
    identifier: String,
}

impl CachedConfiguration {
    pub fn new(cache_dir: impl Into<PathBuf>, identifier: impl Into<String>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            identifier: identifier.into(),
        }
    }

    /// Cache entry for `files` in the cache directory of `environment`.
    pub fn for_files<P: AsRef<Path>>(
        environment: &Environment,
        files: &[P],
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(
            Self::cache_dir_for(environment),
            Self::identifier_for(files)?,
        ))
    }

    /// `<var>/cache/data/typo3_config/{prod,dev}`.
    pub fn cache_dir_for(environment: &Environment) -> PathBuf {
        let flavor = if environment.context().is_production() {
            "prod"
        } else {
            "dev"
        };

        environment
            .var_path()
            .join(CACHE_STORAGE_LOCATION)
            .join(flavor)
    }

    /// Hex SHA-256 over the concatenated hex SHA-256 of each existing file.
    pub fn identifier_for<P: AsRef<Path>>(files: &[P]) -> Result<String, ConfigError> {
        let mut combined = String::new();

        for file in files {
            let file = file.as_ref();
            if !file.is_file() {
                continue;
            }

            let content = std::fs::read(file).map_err(|source| ConfigError::SourceRead {
                path: file.to_path_buf(),
                source,
            })?;
            combined.push_str(&hex::encode(Sha256::digest(&content)));
        }

        Ok(hex::encode(Sha256::digest(combined.as_bytes())))
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn cache_file(&self) -> PathBuf {
        self.cache_dir.join(format!(
            "{CACHE_FILE_PREFIX}{}.{CACHE_FILE_EXTENSION}",
            self.identifier
        ))
    }

    /// Return the cached tree, computing and storing it with `load` on a miss.
    pub fn load_or_insert_with<F>(&self, load: F) -> Result<ConfigTree, ConfigError>
    where
        F: FnOnce() -> Result<ConfigTree, ConfigError>,
    {
        let path = self.cache_file();

        if let Some(config) = self.read_entry(&path)? {
            tracing::debug!(path = %path.display(), "Configuration cache hit");
            return Ok(config);
        }

        tracing::debug!(path = %path.display(), "Configuration cache miss");
        let config = load()?;
        self.write_entry(&path, &config)?;

        Ok(config)
    }

    fn read_entry(&self, path: &Path) -> Result<Option<ConfigTree>, ConfigError> {
        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::CacheRead {
            path: path.to_path_buf(),
            source,
        })?;

        match serde_json::from_str::<StoredEntry>(&content) {
            Ok(entry) if entry.identifier == self.identifier => Ok(Some(entry.config)),
            Ok(_) => {
                backup_corrupt_entry(path, "stored identifier does not match");
                Ok(None)
            }
            Err(e) => {
                backup_corrupt_entry(path, &e.to_string());
                Ok(None)
            }
        }
    }

    fn write_entry(&self, path: &Path, config: &ConfigTree) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::CacheWrite {
            path: path.to_path_buf(),
            source,
        };

        std::fs::create_dir_all(&self.cache_dir).map_err(write_error)?;

        let temp_path = path.with_extension("tmp");
        let content = serde_json::to_string_pretty(&StoredEntryRef {
            identifier: &self.identifier,
            config,
        })?;
        std::fs::write(&temp_path, content).map_err(write_error)?;
        std::fs::rename(&temp_path, path).map_err(write_error)?;

        tracing::debug!(path = %path.display(), "Configuration cached atomically");

        Ok(())
    }
}

/// Move a corrupt cache entry to `<name>.corrupt.{timestamp}`.
///
/// Failure to move the file is logged; the next write replaces it anyway.
fn backup_corrupt_entry(path: &Path, reason: &str) {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let backup_path = path.with_extension(format!("corrupt.{timestamp}"));

    match std::fs::rename(path, &backup_path) {
        Ok(()) => tracing::warn!(
            path = %path.display(),
            backup = %backup_path.display(),
            reason,
            "Cached configuration is corrupt; moved aside"
        ),
        Err(e) => tracing::warn!(
            path = %path.display(),
            error = %e,
            reason,
            "Cached configuration is corrupt and could not be moved aside"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::ApplicationContext;
    use serde_json::{Value, json};
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    fn sample() -> ConfigTree {
        json!({"CMS": {"base": {"foo": "bar"}}})
            .as_object()
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_identifier_without_files_is_hash_of_empty_string() {
        let files: [&Path; 0] = [];
        assert_eq!(CachedConfiguration::identifier_for(&files).unwrap(), EMPTY_SHA256);
    }

    #[test]
    fn test_identifier_skips_missing_files() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.yaml");

        assert_eq!(
            CachedConfiguration::identifier_for(&[missing]).unwrap(),
            EMPTY_SHA256
        );
    }

    #[test]
    fn test_identifier_changes_with_content() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("env.yml");

        fs::write(&file, "a: 1\n").unwrap();
        let first = CachedConfiguration::identifier_for(&[&file]).unwrap();
        fs::write(&file, "a: 2\n").unwrap();
        let second = CachedConfiguration::identifier_for(&[&file]).unwrap();

        assert_ne!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_identifier_depends_on_file_order() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.yaml");
        let b = temp_dir.path().join("b.yaml");
        fs::write(&a, "a: 1\n").unwrap();
        fs::write(&b, "b: 1\n").unwrap();

        assert_ne!(
            CachedConfiguration::identifier_for(&[&a, &b]).unwrap(),
            CachedConfiguration::identifier_for(&[&b, &a]).unwrap()
        );
    }

    #[test]
    fn test_cache_dir_by_context() {
        let production = Environment::new(ApplicationContext::default(), "/srv/site");
        let development = Environment::new(
            ApplicationContext::parse("Development/Local").unwrap(),
            "/srv/site",
        );

        assert_eq!(
            CachedConfiguration::cache_dir_for(&production),
            Path::new("/srv/site/var/cache/data/typo3_config/prod")
        );
        assert_eq!(
            CachedConfiguration::cache_dir_for(&development),
            Path::new("/srv/site/var/cache/data/typo3_config/dev")
        );
    }

    #[test]
    fn test_load_or_insert_with_computes_once() {
        let temp_dir = TempDir::new().unwrap();
        let cache = CachedConfiguration::new(temp_dir.path().join("cache"), "abc");
        let calls = Cell::new(0);
        let load = || -> Result<ConfigTree, ConfigError> {
            calls.set(calls.get() + 1);
            Ok(sample())
        };

        assert_eq!(cache.load_or_insert_with(load).unwrap(), sample());
        assert_eq!(cache.load_or_insert_with(load).unwrap(), sample());

        assert_eq!(calls.get(), 1);
        assert!(cache.cache_file().ends_with("cached-config-abc.json"));
        assert!(cache.cache_file().is_file());
    }

    #[test]
    fn test_load_error_is_not_cached() {
        let temp_dir = TempDir::new().unwrap();
        let cache = CachedConfiguration::new(temp_dir.path(), "abc");

        let result = cache.load_or_insert_with(|| {
            Err(ConfigError::SourceParse {
                path: PathBuf::from("env.yml"),
                message: "broken".to_string(),
            })
        });

        assert!(result.is_err());
        assert!(!cache.cache_file().exists());
    }

    #[test]
    fn test_corrupt_entry_is_backed_up_and_recomputed() {
        let temp_dir = TempDir::new().unwrap();
        let cache = CachedConfiguration::new(temp_dir.path(), "abc");
        fs::write(cache.cache_file(), "{not json").unwrap();

        let config = cache.load_or_insert_with(|| Ok(sample())).unwrap();
        assert_eq!(config, sample());

        let backups: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().contains(".corrupt."))
            .collect();
        assert_eq!(backups.len(), 1);

        let cached: Value =
            serde_json::from_str(&fs::read_to_string(cache.cache_file()).unwrap()).unwrap();
        assert_eq!(cached["identifier"], json!("abc"));
        assert_eq!(cached["config"], Value::Object(sample()));
    }

    #[test]
    fn test_entry_with_foreign_identifier_is_not_used() {
        let temp_dir = TempDir::new().unwrap();
        let cache = CachedConfiguration::new(temp_dir.path(), "abc");
        fs::write(
            cache.cache_file(),
            json!({"identifier": "other", "config": {"stale": true}}).to_string(),
        )
        .unwrap();

        let config = cache.load_or_insert_with(|| Ok(sample())).unwrap();

        assert_eq!(config, sample());
    }
}
