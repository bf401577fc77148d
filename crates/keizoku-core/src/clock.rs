//! Injectable clock so tests can simulate arbitrary day sequences.

use chrono::{DateTime, Utc};

use crate::daykey::DayKey;

/// Source of "now" for read-time replenishment projection.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// The current UTC+9 calendar day.
    fn today(&self) -> DayKey {
        DayKey::from_instant(self.now())
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a fixed instant, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
