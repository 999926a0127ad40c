//! Clock port.

use chrono::{DateTime, Utc};

/// Provides the current time, used to date newly created checklists.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}
