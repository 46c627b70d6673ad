//! Injected time source.
//!
//! Everything that compares dates or stamps events goes through
//! [`Clock`] so the core stays deterministic under test.

use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};

/// Time source abstraction.
pub trait Clock: Send + Sync {
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar date in UTC.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock implementation for production wiring.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests and deterministic runs.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    /// Create a clock frozen at the given instant.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// Move the clock to a new instant.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write().expect("clock lock poisoned") = now;
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().expect("clock lock poisoned");
        *now += chrono::Duration::from_std(by).expect("duration out of range");
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().expect("clock lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn fixed_clock_holds_and_advances() {
        let clock = FixedClock::at(instant("2024-06-01T10:00:00Z"));
        assert_eq!(clock.now(), instant("2024-06-01T10:00:00Z"));
        assert_eq!(clock.today(), "2024-06-01".parse::<NaiveDate>().unwrap());

        clock.advance(Duration::from_secs(60 * 60 * 24));
        assert_eq!(clock.today(), "2024-06-02".parse::<NaiveDate>().unwrap());

        clock.set(instant("2025-01-01T00:00:00Z"));
        assert_eq!(clock.now(), instant("2025-01-01T00:00:00Z"));
    }
}
