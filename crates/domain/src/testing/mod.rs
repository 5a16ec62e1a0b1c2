//! Response testing and expectations.
//!
//! This module provides types for declaring test cases, the expectations
//! checked against their responses, and the reports produced by a run.

mod case;
mod expectation;
mod path;
mod report;

pub use case::TestCase;
pub use expectation::{ComparisonMode, Expectation, JsonKind, StatusClass};
pub use path::{PathSegment, PropertyPath};
pub use report::{
    ExpectationResult, SuiteReport, TestOutcome, TestReport, TransportErrorKind,
};
