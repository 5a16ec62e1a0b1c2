//! HTTP Client port

use async_trait::async_trait;
use thiserror::Error;
use reqcheck_domain::{RequestSpec, ResponseSpec, TransportErrorKind};

/// Errors raised when no response could be obtained.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The request URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The exchange did not complete in time.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// The host name could not be resolved.
    #[error("could not resolve host '{host}': {message}")]
    DnsError {
        /// Host that failed to resolve.
        host: String,
        /// Underlying error message.
        message: String,
    },

    /// The server refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The connection could not be established or was lost.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The redirect limit was exceeded.
    #[error("too many redirects (max {max})")]
    TooManyRedirects {
        /// Redirect limit.
        max: usize,
    },

    /// The request body could not be encoded.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Maps this error onto the category reported in test results.
    #[must_use]
    pub const fn to_error_kind(&self) -> TransportErrorKind {
        match self {
            Self::InvalidUrl(_) => TransportErrorKind::InvalidUrl,
            Self::Timeout { .. } => TransportErrorKind::Timeout,
            Self::DnsError { .. } => TransportErrorKind::DnsError,
            Self::ConnectionRefused { .. } => TransportErrorKind::ConnectionRefused,
            Self::ConnectionFailed(_) => TransportErrorKind::ConnectionFailed,
            Self::TooManyRedirects { .. } => TransportErrorKind::TooManyRedirects,
            Self::InvalidBody(_) => TransportErrorKind::InvalidBody,
            Self::Other(_) => TransportErrorKind::Unknown,
        }
    }
}

/// Port for executing HTTP requests.
///
/// This trait abstracts the HTTP client implementation, allowing
/// the application layer to be independent of specific HTTP libraries.
/// Implementations send the request exactly once and never retry.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Executes an HTTP request and returns the fully received response.
    ///
    /// Non-2xx statuses are returned as responses, not errors.
    ///
    /// # Errors
    ///
    /// Returns a `TransportError` if the request fails due to network issues,
    /// timeout, or an unusable URL.
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, TransportError>;
}
