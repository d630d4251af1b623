//! # Web API Testing
//!
//! Test doubles for the web API and the scheduled tasks worker.
//!
//! This crate provides:
//! - [`FixedClock`] and [`test_clock`] for deterministic time
//! - [`MockDatabase`] counting probes, optionally failing or slow
//! - [`SequentialGuidFactory`] for predictable identifiers
//!
//! ## Example
//!
//! ```
//! use webapi_testing::{MockDatabase, test_clock};
//! use webapi_core::{Clock, ClockSnapshot};
//!
//! let snapshot = ClockSnapshot::new(&test_clock());
//! assert_eq!(snapshot.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
//!
//! let database = MockDatabase::healthy();
//! assert_eq!(database.probe_count(), 0);
//! ```

use chrono::{DateTime, Utc};
use webapi_core::environment::Clock;

/// Mock implementations of injected dependencies.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
    use std::time::Duration;
    use uuid::Uuid;
    use webapi_core::GuidFactory;
    use webapi_postgres::{Database, DatabaseError};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use webapi_testing::mocks::FixedClock;
    /// use webapi_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }

    /// In-memory [`Database`] that records how often it was probed.
    ///
    /// Probes can be made to fail or to take a while, which is how the health
    /// cache's single-flight and failure mapping are exercised.
    #[derive(Debug, Default)]
    pub struct MockDatabase {
        probes: AtomicUsize,
        failing: AtomicBool,
        delay: Option<Duration>,
    }

    impl MockDatabase {
        /// A database whose probes succeed immediately.
        #[must_use]
        pub fn healthy() -> Self {
            Self::default()
        }

        /// A database whose probes always fail.
        #[must_use]
        pub fn failing() -> Self {
            Self {
                failing: AtomicBool::new(true),
                ..Self::default()
            }
        }

        /// Make every probe sleep for `delay` before completing.
        ///
        /// Uses `tokio::time::sleep`, so paused-clock tests control it.
        #[must_use]
        pub const fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Switch between failing and succeeding probes.
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// Number of probes started so far.
        #[must_use]
        pub fn probe_count(&self) -> usize {
            self.probes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Database for MockDatabase {
        async fn execute_noop(&self) -> Result<(), DatabaseError> {
            self.probes.fetch_add(1, Ordering::SeqCst);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            if self.failing.load(Ordering::SeqCst) {
                Err(DatabaseError::Unavailable("mock database is down".to_string()))
            } else {
                Ok(())
            }
        }
    }

    /// [`GuidFactory`] returning 1, 2, 3, ... as UUIDs.
    #[derive(Debug, Default)]
    pub struct SequentialGuidFactory {
        next: AtomicU64,
    }

    impl SequentialGuidFactory {
        /// Start counting from 1.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl GuidFactory for SequentialGuidFactory {
        fn create_random(&self) -> Uuid {
            Uuid::from_u128(u128::from(self.next.fetch_add(1, Ordering::SeqCst)) + 1)
        }
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, MockDatabase, SequentialGuidFactory, test_clock};
