//! Runner configuration.

use std::time::Duration;

use reqcheck_domain::{Header, Headers};

use crate::error::{ApplicationError, ApplicationResult};

/// Configuration handed to the runner at construction.
///
/// There is no process-wide base URL: every runner carries its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    base_url: String,
    default_timeout: Duration,
    default_headers: Headers,
    stop_on_failure: bool,
}

impl RunnerConfig {
    /// Timeout applied when a test case does not set its own.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

    /// Creates a configuration for `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::InvalidConfig` if the URL is empty or not http(s).
    pub fn new(base_url: impl Into<String>) -> ApplicationResult<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ApplicationError::InvalidConfig(
                "base URL is required".to_string(),
            ));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ApplicationError::InvalidConfig(format!(
                "base URL must start with http:// or https://: {base_url}"
            )));
        }

        Ok(Self {
            base_url,
            default_timeout: Self::DEFAULT_TIMEOUT,
            default_headers: Headers::new(),
            stop_on_failure: false,
        })
    }

    /// Sets the default timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.add(Header::new(name, value));
        self
    }

    /// Set whether evaluation stops at the first failed expectation.
    #[must_use]
    pub const fn with_stop_on_failure(mut self, stop: bool) -> Self {
        self.stop_on_failure = stop;
        self
    }

    /// Returns the base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the default timeout.
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Returns the headers sent with every request.
    #[must_use]
    pub const fn default_headers(&self) -> &Headers {
        &self.default_headers
    }

    /// Returns whether evaluation stops at the first failure.
    #[must_use]
    pub const fn stop_on_failure(&self) -> bool {
        self.stop_on_failure
    }

    /// Joins the base URL and a path (which may carry a query string).
    #[must_use]
    pub fn resolve(&self, path: &str) -> String {
        if path.is_empty() {
            self.base_url.clone()
        } else if path.starts_with('/') || path.starts_with('?') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}
