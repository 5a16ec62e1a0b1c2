//! Reqcheck Domain - Core test model
//!
//! This crate defines the domain model for the reqcheck HTTP assertion runner.
//! All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod id;
pub mod request;
pub mod response;
pub mod testing;

pub use error::{DomainError, DomainResult};
pub use id::generate_run_id;
pub use request::{Header, Headers, HttpMethod, QueryParam, QueryParams, RequestSpec};
pub use response::ResponseSpec;
pub use testing::{
    ComparisonMode, Expectation, ExpectationResult, JsonKind, PathSegment, PropertyPath,
    StatusClass, SuiteReport, TestCase, TestOutcome, TestReport, TransportErrorKind,
};
