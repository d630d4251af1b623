//! A frozen "current time" for one unit of work.

use crate::environment::Clock;
use chrono::{DateTime, Utc};
use std::fmt;

/// Captures a single instant when constructed and returns it forever after.
///
/// Create one per request or per job execution so that every timestamp written
/// during that unit of work agrees.
///
/// # Example
///
/// ```
/// use webapi_core::{Clock, ClockSnapshot, SystemClock};
///
/// let snapshot = ClockSnapshot::new(&SystemClock);
/// let created_at = snapshot.now();
/// let updated_at = snapshot.now();
/// assert_eq!(created_at, updated_at);
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ClockSnapshot {
    instant: DateTime<Utc>,
}

impl ClockSnapshot {
    /// Read `clock` once and freeze the result.
    #[must_use]
    pub fn new(clock: &dyn Clock) -> Self {
        Self {
            instant: clock.now(),
        }
    }

    /// The captured instant.
    #[must_use]
    pub const fn instant(&self) -> DateTime<Utc> {
        self.instant
    }
}

impl Clock for ClockSnapshot {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

impl fmt::Debug for ClockSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClockSnapshot")
            .field(&self.instant.to_rfc3339())
            .finish()
    }
}

impl fmt::Display for ClockSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.instant.to_rfc3339())
    }
}
