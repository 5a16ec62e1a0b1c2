//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! It sends exactly one request per call and never retries.

use std::error::Error as _;
use std::time::Instant;

use async_trait::async_trait;
use reqcheck_application::ports::{HttpClient, TransportError};
use reqcheck_domain::{HttpMethod, RequestSpec, ResponseSpec};
use reqwest::{Client, Method};
use tracing::trace;

/// Maximum number of redirects followed before giving up.
const MAX_REDIRECTS: usize = 10;

/// HTTP client implementation using reqwest.
///
/// Wraps a shared `reqwest::Client` so connections are pooled across the
/// test cases of a suite.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Creates a new HTTP client with default settings.
    ///
    /// Default configuration:
    /// - Follow redirects: up to 10
    /// - TLS verification: enabled
    /// - User-Agent: "reqcheck/<version>"
    ///
    /// Timeouts are applied per request from `RequestSpec::timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("reqcheck/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self { client })
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Joins an error with all of its sources.
    ///
    /// reqwest keeps the interesting part ("Connection refused", "failed to
    /// lookup address") in the source chain, not in the top-level message.
    fn error_chain(error: &reqwest::Error) -> String {
        let mut message = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }

    /// Maps reqwest errors to the transport error taxonomy.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }

        if error.is_redirect() {
            return TransportError::TooManyRedirects { max: MAX_REDIRECTS };
        }

        // The URL is checked before building, so this is a bad header.
        if error.is_builder() {
            return TransportError::Other(format!(
                "invalid request: {}",
                Self::error_chain(error)
            ));
        }

        let message = Self::error_chain(error);
        let host = || {
            error
                .url()
                .and_then(|u| u.host_str())
                .unwrap_or("unknown")
                .to_string()
        };

        if error.is_connect() {
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") || lower.contains("lookup") {
                return TransportError::DnsError {
                    host: host(),
                    message,
                };
            }
            if lower.contains("refused") {
                return TransportError::ConnectionRefused {
                    host: host(),
                    port: error
                        .url()
                        .and_then(reqwest::Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return TransportError::ConnectionFailed(message);
        }

        if error.is_body() || error.is_decode() {
            return TransportError::ConnectionFailed(message);
        }

        TransportError::Other(message)
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, TransportError> {
        let url = request
            .parse_url()
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        let timeout_ms = request.timeout_ms();

        let start = Instant::now();

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .timeout(request.timeout);

        for header in request.headers.iter() {
            builder = builder.header(&header.name, &header.value);
        }

        // Only methods that carry a payload send one.
        if let Some(body) = request.body.as_ref().filter(|_| request.method.has_body()) {
            let bytes = serde_json::to_vec(body)
                .map_err(|e| TransportError::InvalidBody(format!("Invalid JSON: {e}")))?;
            if request.headers.get("content-type").is_none() {
                builder = builder.header(reqwest::header::CONTENT_TYPE, "application/json");
            }
            builder = builder.body(bytes);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?;

        let status = response.status();

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?;

        let duration = start.elapsed();
        trace!(status = status.as_u16(), bytes = body.len(), ?duration, "response read");

        let response = ResponseSpec::new(status.as_u16(), headers, &body, duration);
        Ok(match status.canonical_reason() {
            Some(reason) => response.with_status_text(reason),
            None => response,
        })
    }
}
