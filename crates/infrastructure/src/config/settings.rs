//! Runner settings.
//!
//! Sources, lowest priority first:
//! - built-in defaults
//! - `reqcheck.toml` in the working directory (or an explicit file)
//! - `REQCHECK__*` environment variables, e.g. `REQCHECK__TIMEOUT_MS=5000`

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use reqwest::header::{HeaderName, HeaderValue};
use reqcheck_application::{ApplicationError, REQRES_BASE_URL, RunnerConfig};
use serde::Deserialize;
use tracing::debug;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "REQCHECK";

/// Settings file looked up in the working directory.
pub const SETTINGS_FILE: &str = "reqcheck.toml";

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A source could not be read or deserialized.
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    /// A value is out of range.
    #[error("Invalid setting '{field}': {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The settings could not be turned into a runner configuration.
    #[error(transparent)]
    Runner(#[from] ApplicationError),
}

/// Runner settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL every test path is resolved against.
    pub base_url: String,
    /// Default per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Stop evaluating a case at its first failed expectation.
    pub stop_on_failure: bool,
    /// Maximum requests in flight; 1 runs the suite sequentially.
    pub concurrency: usize,
    /// Headers sent with every request.
    pub headers: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: REQRES_BASE_URL.to_string(),
            timeout_ms: u64::try_from(RunnerConfig::DEFAULT_TIMEOUT.as_millis()).unwrap_or(2000),
            stop_on_failure: false,
            concurrency: 1,
            headers: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Loads settings from `path` (or `reqcheck.toml` when absent) and the
    /// process environment, then validates them.
    ///
    /// An explicit `path` must exist; the default file is optional.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or a value is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_with_env(
            path,
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self, SettingsError> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::new(SETTINGS_FILE, FileFormat::Toml).required(false),
        };

        let settings: Self = Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        debug!(
            base_url = %settings.base_url,
            timeout_ms = settings.timeout_ms,
            concurrency = settings.concurrency,
            "settings loaded"
        );
        Ok(settings)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Invalid` naming the first bad field.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let base_url = self.base_url.trim();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(SettingsError::Invalid {
                field: "base_url",
                reason: format!("must start with http:// or https://, got '{base_url}'"),
            });
        }
        if self.timeout_ms == 0 {
            return Err(SettingsError::Invalid {
                field: "timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.concurrency == 0 {
            return Err(SettingsError::Invalid {
                field: "concurrency",
                reason: "must be at least 1".to_string(),
            });
        }
        for (name, value) in &self.headers {
            if HeaderName::from_bytes(name.as_bytes()).is_err() {
                return Err(SettingsError::Invalid {
                    field: "headers",
                    reason: format!("'{name}' is not a valid header name"),
                });
            }
            if HeaderValue::from_str(value).is_err() {
                return Err(SettingsError::Invalid {
                    field: "headers",
                    reason: format!("value of '{name}' is not a valid header value"),
                });
            }
        }
        Ok(())
    }

    /// Default timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns true when cases run one after another.
    #[must_use]
    pub const fn is_sequential(&self) -> bool {
        self.concurrency <= 1
    }

    /// Builds the runner configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is rejected by `RunnerConfig`.
    pub fn runner_config(&self) -> Result<RunnerConfig, SettingsError> {
        let config = self
            .headers
            .iter()
            .fold(RunnerConfig::new(&self.base_url)?, |config, (name, value)| {
                config.with_header(name, value)
            })
            .with_timeout(self.timeout())
            .with_stop_on_failure(self.stop_on_failure);
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .source(Some(source))
    }

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.base_url, "https://reqres.in");
        assert_eq!(settings.timeout(), Duration::from_millis(2000));
        assert!(settings.is_sequential());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = toml_file(
            r#"
base_url = "http://localhost:8080"
timeout_ms = 5000
concurrency = 4

[headers]
x-api-key = "reqres-free-v1"
"#,
        );

        let settings = Settings::load_with_env(Some(file.path()), env(&[])).unwrap();

        assert_eq!(settings.base_url, "http://localhost:8080");
        assert_eq!(settings.timeout_ms, 5000);
        assert_eq!(settings.concurrency, 4);
        assert!(!settings.stop_on_failure);
        assert_eq!(
            settings.headers.get("x-api-key").map(String::as_str),
            Some("reqres-free-v1")
        );
    }

    #[test]
    fn test_env_overrides_file() {
        let file = toml_file("timeout_ms = 5000\n");

        let settings = Settings::load_with_env(
            Some(file.path()),
            env(&[
                ("REQCHECK__TIMEOUT_MS", "7000"),
                ("REQCHECK__STOP_ON_FAILURE", "true"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.timeout_ms, 7000);
        assert!(settings.stop_on_failure);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Settings::load_with_env(Some(&dir.path().join("absent.toml")), env(&[]));
        assert!(matches!(result, Err(SettingsError::Load(_))));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let bad_url = Settings {
            base_url: "reqres.in".to_string(),
            ..Settings::default()
        };
        assert!(matches!(
            bad_url.validate(),
            Err(SettingsError::Invalid { field: "base_url", .. })
        ));

        let zero_timeout = Settings {
            timeout_ms: 0,
            ..Settings::default()
        };
        assert!(matches!(
            zero_timeout.validate(),
            Err(SettingsError::Invalid { field: "timeout_ms", .. })
        ));

        let zero_concurrency = Settings {
            concurrency: 0,
            ..Settings::default()
        };
        assert!(matches!(
            zero_concurrency.validate(),
            Err(SettingsError::Invalid { field: "concurrency", .. })
        ));
    }

    #[test]
    fn test_validation_rejects_bad_headers() {
        let mut settings = Settings::default();
        settings
            .headers
            .insert("x api key".to_string(), "reqres-free-v1".to_string());
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid { field: "headers", .. })
        ));

        let mut settings = Settings::default();
        settings
            .headers
            .insert("x-api-key".to_string(), "line\nbreak".to_string());
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid { field: "headers", .. })
        ));

        let mut settings = Settings::default();
        settings
            .headers
            .insert("x-api-key".to_string(), "reqres-free-v1".to_string());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_runner_config() {
        let mut settings = Settings {
            base_url: "https://reqres.in/".to_string(),
            timeout_ms: 3000,
            stop_on_failure: true,
            ..Settings::default()
        };
        settings
            .headers
            .insert("x-api-key".to_string(), "reqres-free-v1".to_string());

        let config = settings.runner_config().unwrap();

        assert_eq!(config.base_url(), "https://reqres.in");
        assert_eq!(config.default_timeout(), Duration::from_secs(3));
        assert!(config.stop_on_failure());
        assert_eq!(config.default_headers().get("X-Api-Key"), Some("reqres-free-v1"));
    }
}
