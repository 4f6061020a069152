use chrono::{Duration, Utc};
use std::sync::{Mutex, PoisonError};

use crate::model::Timestamp;

/// Source of the timestamps attached to domain events
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Clock under the caller's control.
///
/// A ticking clock advances by a fixed step after every reading, so
/// consecutive readings are distinct and ordered.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<Timestamp>,
    tick: Duration,
}

impl ManualClock {
    /// Clock frozen at `at`
    pub fn frozen(at: Timestamp) -> Self {
        Self {
            current: Mutex::new(at),
            tick: Duration::zero(),
        }
    }

    /// Clock starting at `at`, advancing by `tick` after each reading
    pub fn ticking(at: Timestamp, tick: Duration) -> Self {
        Self {
            current: Mutex::new(at),
            tick,
        }
    }

    pub fn set(&self, at: Timestamp) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let reading = *current;
        *current += self.tick;
        reading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_frozen_clock_repeats() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let clock = ManualClock::frozen(at);
        assert_eq!(clock.now(), at);
        assert_eq!(clock.now(), at);

        clock.advance(Duration::seconds(5));
        assert_eq!(clock.now(), at + Duration::seconds(5));
    }

    #[test]
    fn test_ticking_clock_advances_per_reading() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let clock = ManualClock::ticking(at, Duration::milliseconds(10));
        assert_eq!(clock.now(), at);
        assert_eq!(clock.now(), at + Duration::milliseconds(10));

        clock.set(at);
        assert_eq!(clock.now(), at);
    }
}
