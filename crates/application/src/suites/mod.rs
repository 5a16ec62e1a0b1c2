//! Built-in test suites.

mod reqres;

pub use reqres::{REQRES_BASE_URL, reqres_suite};
