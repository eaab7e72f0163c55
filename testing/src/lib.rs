//! # Check-in Testing
//!
//! Testing utilities for the check-in console:
//!
//! - [`FixedClock`] / [`test_clock`]: deterministic time
//! - [`ReducerTest`]: Given-When-Then harness for reducers
//! - [`InMemoryBackend`]: a [`Backend`](checkin_api::Backend) that keeps
//!   everything in memory and follows the real backend's ticket rules
//!
//! ## Example
//!
//! ```
//! use checkin_api::Gateway;
//! use checkin_testing::{test_clock, InMemoryBackend};
//! use std::sync::Arc;
//!
//! let backend = InMemoryBackend::with_clock(test_clock());
//! let _gateway = Gateway::new(Arc::new(backend.clone()));
//! assert!(backend.calls().is_empty());
//! ```

pub mod backend;

use chrono::{DateTime, NaiveDate, Utc};
use checkin_core::environment::Clock;

/// Mock implementations of Environment traits.
pub mod mocks {
    use super::{Clock, DateTime, NaiveDate, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use checkin_testing::mocks::FixedClock;
    /// use checkin_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a fixed clock at `time`.
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }

        /// Noon UTC of `date`, so "today" is unambiguous.
        #[must_use]
        pub fn at_noon(date: NaiveDate) -> Self {
            Self::new(date.and_time(chrono::NaiveTime::MIN).and_utc() + chrono::Duration::hours(12))
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Default fixed clock for tests (2025-01-01 00:00:00 UTC).
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }
}

pub use backend::InMemoryBackend;
pub use mocks::{test_clock, FixedClock};
pub use reducer_test::{assertions, ReducerTest};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default());
    }

    #[test]
    fn test_at_noon_stays_on_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap_or_default();
        assert_eq!(FixedClock::at_noon(date).today(), date);
    }
}
