//! HTTP Request domain types

mod header;
mod method;
mod query;
mod spec;

pub use header::{Header, Headers};
pub use method::HttpMethod;
pub use query::{QueryParam, QueryParams};
pub use spec::RequestSpec;
pub(crate) use spec::duration_millis;
