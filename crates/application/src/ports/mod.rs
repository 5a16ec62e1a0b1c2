//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod evaluator;
mod http_client;

pub use clock::Clock;
pub use evaluator::ResponseEvaluator;
pub use http_client::{HttpClient, TransportError};
