//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur while building or inspecting test cases.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The resolved request URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A property path could not be parsed.
    #[error("invalid property path '{path}': {reason}")]
    InvalidPropertyPath {
        /// The offending path.
        path: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
