//! Use cases for the reqcheck application layer.

mod run_suite;
mod run_test_case;

pub use run_suite::RunSuite;
pub use run_test_case::RunTestCase;
