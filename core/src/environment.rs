//! Environment traits injected into reducers.

use chrono::{DateTime, NaiveDate, Utc};

/// Clock trait - abstracts time operations for testability
///
/// Ticket eligibility ("generate" only for today or later, "sweep" only on
/// the event day) and session expiry both depend on the current time, so the
/// clock is always injected.
///
/// # Examples
///
/// ```
/// use checkin_core::environment::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// assert_eq!(clock.today(), clock.now().date_naive());
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;

    /// The current calendar day (UTC)
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
