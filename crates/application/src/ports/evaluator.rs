//! Response evaluator port

use reqcheck_domain::{Expectation, ExpectationResult, ResponseSpec};

/// Port for checking a single expectation against a received response.
///
/// Evaluation never fails as a whole: a malformed body or an invalid pattern
/// is reported as a failed `ExpectationResult` for that expectation only.
pub trait ResponseEvaluator: Send + Sync {
    /// Evaluates one expectation.
    fn evaluate(&self, expectation: &Expectation, response: &ResponseSpec) -> ExpectationResult;
}
