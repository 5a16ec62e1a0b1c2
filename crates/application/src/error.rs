//! Application error types

use reqcheck_domain::DomainError;
use thiserror::Error;

use crate::ports::TransportError;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// An HTTP exchange failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The runner configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
