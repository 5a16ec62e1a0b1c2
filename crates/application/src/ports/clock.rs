//! Clock port for time-related operations

use chrono::{DateTime, Utc};

/// Port for getting the current time.
///
/// Test cases that pin server-generated timestamps to "today" read the date
/// through this port so they can be checked against a fixed clock.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns today's UTC date as `YYYY-MM-DD`.
    fn today(&self) -> String {
        self.now().format("%Y-%m-%d").to_string()
    }
}
