//! Response evaluation.
//!
//! This module provides the evaluator that checks expectations against HTTP responses.

mod evaluator;

pub use evaluator::ExpectationEvaluator;
