//! Wall-clock abstraction for testability
//!
//! Every "now" read in the date-range engine goes through a [`Clock`], so
//! activity checks and activation defaults can be exercised against a fixed
//! instant.
//!
//! # Examples
//!
//! ```
//! use daterange_common::time::{Clock, SystemClock};
//!
//! let clock = SystemClock;
//! let first = clock.now();
//! assert!(clock.now() >= first);
//! ```

use chrono::{DateTime, Utc};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Current wall-clock instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Real system clock implementation
///
/// Use this in production code.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(feature = "test-utils")]
pub use mock::MockClock;

#[cfg(feature = "test-utils")]
mod mock {
    use std::sync::{Arc, Mutex, PoisonError};

    use chrono::{DateTime, Duration, Utc};

    use super::Clock;

    /// Mock clock for deterministic testing
    ///
    /// The clock is frozen at a caller-chosen instant and only moves when
    /// [`MockClock::advance`] or [`MockClock::set`] is called. Clones share
    /// the same underlying instant.
    ///
    /// ```
    /// use chrono::{Duration, TimeZone, Utc};
    /// use daterange_common::time::{Clock, MockClock};
    ///
    /// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    /// let clock = MockClock::at(start);
    /// clock.advance(Duration::days(1));
    /// assert_eq!(clock.now(), start + Duration::days(1));
    /// ```
    #[derive(Debug, Clone)]
    pub struct MockClock {
        current: Arc<Mutex<DateTime<Utc>>>,
    }

    impl MockClock {
        /// Create a mock clock frozen at `instant`.
        #[must_use]
        pub fn at(instant: DateTime<Utc>) -> Self {
            Self { current: Arc::new(Mutex::new(instant)) }
        }

        /// Move the clock forward (or backward, for negative durations).
        pub fn advance(&self, duration: Duration) {
            let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
            *current += duration;
        }

        /// Jump the clock to an absolute instant.
        pub fn set(&self, instant: DateTime<Utc>) {
            *self.current.lock().unwrap_or_else(PoisonError::into_inner) = instant;
        }
    }

    impl Default for MockClock {
        fn default() -> Self {
            Self::at(Utc::now())
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> DateTime<Utc> {
            *self.current.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }
}
