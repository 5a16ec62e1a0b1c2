//! Request specification type

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::{Headers, HttpMethod};
use crate::error::{DomainError, DomainResult};

/// A fully resolved outbound HTTP request, ready for a transport to send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute target URL, including any query string
    pub url: String,
    /// HTTP headers
    #[serde(default)]
    pub headers: Headers,
    /// JSON payload; only present for methods that carry a body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    /// Time allowed for the whole exchange
    #[serde(with = "duration_millis")]
    pub timeout: Duration,
}

impl RequestSpec {
    /// Creates a request without headers or body.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
            timeout,
        }
    }

    /// Validates the URL and returns the parsed version if valid.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` if the URL is malformed or not http(s).
    pub fn parse_url(&self) -> DomainResult<Url> {
        let url = Url::parse(&self.url)
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {}", self.url)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(DomainError::InvalidUrl(format!(
                "unsupported scheme '{other}': {}",
                self.url
            ))),
        }
    }

    /// Returns the timeout in whole milliseconds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

pub(crate) mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
