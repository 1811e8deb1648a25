//! Configuration from prefixed process environment variables.
//!
//! Responsibilities:
//! - Read variables such as `TYPO3__CMS__base__foo` into nested trees.
//! - Select the safe (`__`) or deprecated legacy (`_`) delimiter.
//! - Emit the legacy-delimiter deprecation at most once per process.
//! - Provide `env_var_or_none` for reading single settings.
//!
//! Invariants:
//! - Path components keep their case; values are stored as strings.
//! - Variables with empty path components are ignored.
//! - Control variables (see `constants::CONTROL_VARIABLES`) are never configuration.
//! - Empty or whitespace-only variables read via `env_var_or_none` count as unset.

use std::sync::Once;

use serde_json::Value;

use super::ConfigReader;
use crate::bootstrap::Environment;
use crate::constants::{
    CONTROL_VARIABLES, ENV_READER_PREFIX, LEGACY_ENV_DELIMITER, SAFE_ENV_DELIMITER,
    SAFE_SEPARATOR_FLAG_VAR,
};
use crate::loader::ConfigError;
use crate::tree::{self, ConfigTree};

static LEGACY_SEPARATOR_WARNING: Once = Once::new();

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Delimiter between the prefix and the path components of a variable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeparatorMode {
    /// `TYPO3__CMS__base__foo`
    #[default]
    Safe,
    /// `TYPO3_CMS_base_foo`; deprecated because keys containing `_` cannot be expressed.
    Legacy,
}

impl SeparatorMode {
    /// Mode selected by `TYPO3_CONFIG_LOADER_USE_SAFE_SEPARATOR`.
    pub fn from_env() -> Self {
        Self::from_flag(env_var_or_none(SAFE_SEPARATOR_FLAG_VAR).as_deref())
    }

    /// Only an explicit falsy flag selects the legacy delimiter.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag.map(str::to_ascii_lowercase).as_deref() {
            Some("0" | "false" | "no" | "off") => SeparatorMode::Legacy,
            _ => SeparatorMode::Safe,
        }
    }

    pub fn delimiter(self) -> &'static str {
        match self {
            SeparatorMode::Safe => SAFE_ENV_DELIMITER,
            SeparatorMode::Legacy => LEGACY_ENV_DELIMITER,
        }
    }
}

/// Returns true if the legacy delimiter deprecation should be reported.
///
/// Non-interactive production runs are exempt.
pub fn legacy_warning_applies(environment: &Environment) -> bool {
    !(environment.context().is_production() && !environment.is_interactive())
}

/// Report use of the legacy delimiter once per process.
pub(crate) fn deprecate_legacy_separator(environment: &Environment) {
    warn_legacy_separator_once(&LEGACY_SEPARATOR_WARNING, environment);
}

fn warn_legacy_separator_once(once: &Once, environment: &Environment) {
    if !legacy_warning_applies(environment) {
        return;
    }

    once.call_once(|| {
        tracing::warn!(
            flag = SAFE_SEPARATOR_FLAG_VAR,
            "The single underscore delimiter for TYPO3_ environment variables is deprecated; \
             unset the flag and use TYPO3__ with double underscores instead"
        );
    });
}

/// Reads configuration from variables named `<prefix><delimiter><path>`.
#[derive(Debug, Clone)]
pub struct EnvironmentReader {
    prefix: String,
    delimiter: String,
    vars: Vec<(String, String)>,
}

impl EnvironmentReader {
    /// Snapshot the process environment. Non-UTF-8 variables are ignored.
    pub fn new(prefix: impl Into<String>, delimiter: impl Into<String>) -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)));
        Self::with_vars(prefix, delimiter, vars)
    }

    /// Reader over an explicit set of variables.
    pub fn with_vars<I, K, V>(prefix: impl Into<String>, delimiter: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut vars: Vec<(String, String)> = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        vars.sort();

        Self {
            prefix: prefix.into(),
            delimiter: delimiter.into(),
            vars,
        }
    }

    /// Reader for the `TYPO3` prefix in the given mode.
    pub fn for_mode(mode: SeparatorMode) -> Self {
        Self::new(ENV_READER_PREFIX, mode.delimiter())
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Path components of `key`, if it belongs to this reader.
    fn path_of<'a>(&self, key: &'a str) -> Option<Vec<&'a str>> {
        if CONTROL_VARIABLES.contains(&key) {
            return None;
        }

        let rest = key
            .strip_prefix(self.prefix.as_str())?
            .strip_prefix(self.delimiter.as_str())?;
        let segments: Vec<&str> = rest.split(self.delimiter.as_str()).collect();

        if segments.iter().any(|segment| segment.is_empty()) {
            tracing::debug!(key, "Ignoring environment variable with empty path component");
            return None;
        }

        Some(segments)
    }
}

impl ConfigReader for EnvironmentReader {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn has_config(&self) -> bool {
        self.vars.iter().any(|(key, _)| self.path_of(key).is_some())
    }

    fn read_config(&self) -> Result<ConfigTree, ConfigError> {
        let mut config = ConfigTree::new();

        for (key, value) in &self.vars {
            if let Some(segments) = self.path_of(key) {
                tree::set_value_by_path(&mut config, &segments, Value::String(value.clone()));
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::ApplicationContext;
    use serde_json::json;
    use serial_test::serial;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    /// Log output captured from a scoped subscriber.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture_logs<F: FnOnce()>(f: F) -> String {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, f);
        logs.contents()
    }

    fn safe_reader(vars: &[(&str, &str)]) -> EnvironmentReader {
        EnvironmentReader::with_vars("TYPO3", "__", vars.iter().copied())
    }

    #[test]
    #[serial]
    fn test_env_var_or_none_filters_empty_and_whitespace_strings() {
        let key = "_TYPO3_CONFIG_LOADER_TEST_VAR";
        temp_env::with_var_unset(key, || {
            assert!(env_var_or_none(key).is_none());
        });
        temp_env::with_var(key, Some(""), || {
            assert!(env_var_or_none(key).is_none());
        });
        temp_env::with_var(key, Some("   "), || {
            assert!(env_var_or_none(key).is_none());
        });
        temp_env::with_var(key, Some(" value "), || {
            assert_eq!(env_var_or_none(key), Some("value".to_string()));
        });
    }

    #[test]
    fn test_safe_delimiter_builds_nested_tree() {
        let reader = safe_reader(&[
            ("TYPO3__FOO", "baz"),
            ("TYPO3__CMS__base__foo", "bar"),
            ("TYPO3__CMS__base__nested__x", "1"),
            ("OTHER__FOO", "ignored"),
            ("TYPO3_LEGACY", "ignored"),
        ]);

        assert!(reader.has_config());
        assert_eq!(
            Value::Object(reader.read_config().unwrap()),
            json!({"FOO": "baz", "CMS": {"base": {"foo": "bar", "nested": {"x": "1"}}}})
        );
    }

    #[test]
    fn test_legacy_delimiter_splits_on_single_underscore() {
        let reader = EnvironmentReader::with_vars(
            "TYPO3",
            "_",
            [("TYPO3_CMS_base_foo", "bar"), ("TYPO3_CONTEXT", "Production")],
        );

        assert_eq!(
            Value::Object(reader.read_config().unwrap()),
            json!({"CMS": {"base": {"foo": "bar"}}})
        );
    }

    #[test]
    fn test_legacy_delimiter_ignores_control_variables() {
        let reader = EnvironmentReader::with_vars(
            "TYPO3",
            "_",
            [
                ("TYPO3_CONFIG_LOADER_USE_SAFE_SEPARATOR", "0"),
                ("TYPO3_PATH_APP", "/srv/site"),
            ],
        );

        assert!(!reader.has_config());
        assert!(reader.read_config().unwrap().is_empty());
    }

    #[test]
    fn test_empty_path_components_are_ignored() {
        let reader = safe_reader(&[("TYPO3__A____B", "x"), ("TYPO3__", "y"), ("TYPO3__C__", "z")]);

        assert!(!reader.has_config());
        assert!(reader.read_config().unwrap().is_empty());
    }

    #[test]
    fn test_deeper_variable_replaces_scalar() {
        let reader = safe_reader(&[("TYPO3__CMS", "flat"), ("TYPO3__CMS__TEST", "test")]);

        assert_eq!(
            Value::Object(reader.read_config().unwrap()),
            json!({"CMS": {"TEST": "test"}})
        );
    }

    #[test]
    fn test_separator_mode_from_flag() {
        assert_eq!(SeparatorMode::from_flag(None), SeparatorMode::Safe);
        assert_eq!(SeparatorMode::from_flag(Some("1")), SeparatorMode::Safe);
        assert_eq!(SeparatorMode::from_flag(Some("true")), SeparatorMode::Safe);
        assert_eq!(SeparatorMode::from_flag(Some("0")), SeparatorMode::Legacy);
        assert_eq!(SeparatorMode::from_flag(Some("FALSE")), SeparatorMode::Legacy);
        assert_eq!(SeparatorMode::from_flag(Some("off")), SeparatorMode::Legacy);
    }

    #[test]
    #[serial]
    fn test_separator_mode_from_env() {
        temp_env::with_var(SAFE_SEPARATOR_FLAG_VAR, Some("false"), || {
            assert_eq!(SeparatorMode::from_env(), SeparatorMode::Legacy);
        });
        temp_env::with_var_unset(SAFE_SEPARATOR_FLAG_VAR, || {
            assert_eq!(SeparatorMode::from_env(), SeparatorMode::Safe);
        });
    }

    #[test]
    fn test_legacy_warning_exempts_non_interactive_production() {
        let production = ApplicationContext::parse("Production/Live").unwrap();
        let development = ApplicationContext::parse("Development").unwrap();

        let env = Environment::new(production.clone(), "/srv/site");
        assert!(!legacy_warning_applies(&env));
        assert!(legacy_warning_applies(&env.clone().with_interactive(true)));
        assert!(legacy_warning_applies(
            &Environment::new(development, "/srv/site")
        ));
    }

    #[test]
    fn test_legacy_separator_warning_is_emitted_once() {
        let once = Once::new();
        let env = Environment::new(ApplicationContext::parse("Development").unwrap(), "/srv/site");

        let output = capture_logs(|| {
            for _ in 0..3 {
                warn_legacy_separator_once(&once, &env);
            }
        });

        assert_eq!(output.matches(" WARN ").count(), 1, "got: {output}");
        assert_eq!(output.matches("deprecated").count(), 1, "got: {output}");
        assert!(output.contains(SAFE_SEPARATOR_FLAG_VAR));
    }

    #[test]
    fn test_legacy_separator_warning_skipped_for_non_interactive_production() {
        let once = Once::new();
        let env = Environment::new(ApplicationContext::default(), "/srv/site");

        let output = capture_logs(|| warn_legacy_separator_once(&once, &env));

        assert!(output.is_empty(), "got: {output}");
        assert!(!once.is_completed());
    }
}
