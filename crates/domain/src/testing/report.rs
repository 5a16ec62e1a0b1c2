//! Results of running test cases.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::expectation::Expectation;
use crate::request::{HttpMethod, duration_millis};

/// Result of evaluating a single expectation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpectationResult {
    /// The expectation that was evaluated.
    pub expectation: Expectation,
    /// Whether the expectation held.
    pub passed: bool,
    /// Expected value (for display).
    pub expected: Option<String>,
    /// Actual value found (for display).
    pub actual: Option<String>,
    /// Error message if failed.
    pub error: Option<String>,
}

impl ExpectationResult {
    /// Create a passed result.
    #[must_use]
    pub const fn pass(expectation: Expectation) -> Self {
        Self {
            expectation,
            passed: true,
            expected: None,
            actual: None,
            error: None,
        }
    }

    /// Create a passed result with actual value.
    #[must_use]
    pub fn pass_with_value(expectation: Expectation, actual: impl Into<String>) -> Self {
        Self {
            expectation,
            passed: true,
            expected: None,
            actual: Some(actual.into()),
            error: None,
        }
    }

    /// Create a failed result.
    #[must_use]
    pub fn fail(expectation: Expectation, error: impl Into<String>) -> Self {
        Self {
            expectation,
            passed: false,
            expected: None,
            actual: None,
            error: Some(error.into()),
        }
    }

    /// Create a failed result carrying expected and actual values.
    #[must_use]
    pub fn mismatch(
        expectation: Expectation,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        let expected = expected.into();
        let actual = actual.into();
        let error = format!("{}: expected {expected}, got {actual}", expectation.description());
        Self {
            expectation,
            passed: false,
            expected: Some(expected),
            actual: Some(actual),
            error: Some(error),
        }
    }

    /// Diagnostic line for a failed result.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| self.expectation.description())
    }
}

/// Categories of transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    /// Invalid URL format.
    InvalidUrl,
    /// DNS resolution failed.
    DnsError,
    /// Could not establish connection.
    ConnectionFailed,
    /// Connection was refused by the server.
    ConnectionRefused,
    /// Request timed out.
    Timeout,
    /// Request body could not be encoded.
    InvalidBody,
    /// Too many redirects.
    TooManyRedirects,
    /// Unknown or unexpected error.
    Unknown,
}

impl TransportErrorKind {
    /// Returns a human-readable title for this error type.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::InvalidUrl => "Invalid URL",
            Self::DnsError => "DNS Resolution Failed",
            Self::ConnectionFailed => "Connection Failed",
            Self::ConnectionRefused => "Connection Refused",
            Self::Timeout => "Request Timeout",
            Self::InvalidBody => "Invalid Request Body",
            Self::TooManyRedirects => "Too Many Redirects",
            Self::Unknown => "Unknown Error",
        }
    }
}

/// Verdict of a single test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TestOutcome {
    /// Every expectation held.
    Passed,
    /// An expectation did not hold.
    Failed {
        /// Diagnostic of the first failing expectation.
        diagnostic: String,
    },
    /// No response was received.
    Errored {
        /// Transport error category.
        kind: TransportErrorKind,
        /// Error message.
        message: String,
    },
}

impl TestOutcome {
    /// Returns true for `Passed`.
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Returns true for `Errored`.
    #[must_use]
    pub const fn is_errored(&self) -> bool {
        matches!(self, Self::Errored { .. })
    }
}

/// Report for one executed test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestReport {
    /// Test case name.
    pub name: String,
    /// HTTP method used.
    pub method: HttpMethod,
    /// Resolved request URL.
    pub url: String,
    /// Response status, when a response arrived.
    pub status: Option<u16>,
    /// Verdict.
    pub outcome: TestOutcome,
    /// Individual expectation results, in evaluation order.
    pub results: Vec<ExpectationResult>,
    /// Wall time for request and evaluation.
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl TestReport {
    /// Builds a report from evaluated expectations.
    ///
    /// The outcome is derived from the first failed result.
    #[must_use]
    pub fn evaluated(
        name: impl Into<String>,
        method: HttpMethod,
        url: impl Into<String>,
        status: u16,
        results: Vec<ExpectationResult>,
        duration: Duration,
    ) -> Self {
        let outcome = results
            .iter()
            .find(|r| !r.passed)
            .map_or(TestOutcome::Passed, |r| TestOutcome::Failed {
                diagnostic: r.diagnostic(),
            });

        Self {
            name: name.into(),
            method,
            url: url.into(),
            status: Some(status),
            outcome,
            results,
            duration,
        }
    }

    /// Builds a report for a request that never produced a response.
    #[must_use]
    pub fn errored(
        name: impl Into<String>,
        method: HttpMethod,
        url: impl Into<String>,
        kind: TransportErrorKind,
        message: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            method,
            url: url.into(),
            status: None,
            outcome: TestOutcome::Errored {
                kind,
                message: message.into(),
            },
            results: Vec::new(),
            duration,
        }
    }

    /// Returns true if the test passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.outcome.is_passed()
    }
}

impl fmt::Display for TestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.duration.as_millis();
        match &self.outcome {
            TestOutcome::Passed => write!(f, "PASS  {} ({millis} ms)", self.name),
            TestOutcome::Failed { diagnostic } => {
                write!(f, "FAIL  {} ({millis} ms): {diagnostic}", self.name)
            }
            TestOutcome::Errored { kind, message } => write!(
                f,
                "ERROR {} ({millis} ms): {}: {message}",
                self.name,
                kind.title()
            ),
        }
    }
}

/// Reports for a whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Identifier of this run.
    pub run_id: Uuid,
    /// Per-case reports, in declaration order.
    pub reports: Vec<TestReport>,
    /// Number of test cases.
    pub total: usize,
    /// Number that passed.
    pub passed: usize,
    /// Number that failed an expectation.
    pub failed: usize,
    /// Number that never got a response.
    pub errored: usize,
    /// Wall time of the run.
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl SuiteReport {
    /// Create a suite report from per-case reports.
    #[must_use]
    pub fn new(run_id: Uuid, reports: Vec<TestReport>, duration: Duration) -> Self {
        let total = reports.len();
        let passed = reports.iter().filter(|r| r.passed()).count();
        let errored = reports.iter().filter(|r| r.outcome.is_errored()).count();

        Self {
            run_id,
            reports,
            total,
            passed,
            failed: total - passed - errored,
            errored,
            duration,
        }
    }

    /// Check if all test cases passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    /// Get pass rate as percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }

    /// One-line summary of the run.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed, {} errored ({} total, {:.1}% passed) in {} ms",
            self.passed,
            self.failed,
            self.errored,
            self.total,
            self.pass_rate(),
            self.duration.as_millis()
        )
    }
}
