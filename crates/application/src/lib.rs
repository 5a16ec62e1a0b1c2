//! Reqcheck Application - Use cases and ports
//!
//! This crate defines the application layer with:
//! - Port traits (HTTP transport, response evaluation, clock)
//! - The single-case runner and the suite runner
//! - Built-in suites and application-level error handling

pub mod config;
pub mod error;
pub mod ports;
pub mod suites;
pub mod use_cases;

pub use config::RunnerConfig;
pub use error::{ApplicationError, ApplicationResult};
pub use ports::{Clock, HttpClient, ResponseEvaluator, TransportError};
pub use suites::{REQRES_BASE_URL, reqres_suite};
pub use use_cases::{RunSuite, RunTestCase};
