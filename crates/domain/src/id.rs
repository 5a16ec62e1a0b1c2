//! ID generation utilities.

use uuid::Uuid;

/// Generates a new run identifier.
///
/// UUID v7 includes timestamp information, so run ids sort by start time.
#[must_use]
pub fn generate_run_id() -> Uuid {
    Uuid::now_v7()
}
