//! Calendar-day bucketing in a fixed UTC+9 offset.
//!
//! Every activity timestamp is reduced to a [`DayKey`] -- the calendar date
//! it falls on in UTC+9 -- before the engine looks at it. Bucketing in a
//! fixed offset keeps day boundaries stable regardless of the timezone of
//! the device that recorded the activity, so two submissions from different
//! devices on the same JST day always collapse to the same key.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StreakError;

/// Offset all day bucketing happens in (UTC+9).
const BUCKET_OFFSET_SECS: i32 = 9 * 3600;

fn bucket_offset() -> FixedOffset {
    FixedOffset::east_opt(BUCKET_OFFSET_SECS).expect("offset within +/-24h")
}

/// A canonical calendar date in the bucketing offset.
///
/// Serialized as `YYYY-MM-DD`. Ordering is chronological.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DayKey(NaiveDate);

impl DayKey {
    /// Bucket an instant into its UTC+9 calendar date.
    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        Self(instant.with_timezone(&bucket_offset()).date_naive())
    }

    /// Parse a `YYYY-MM-DD` day key.
    ///
    /// # Errors
    /// Returns [`StreakError::InvalidDate`] if the string is not a valid
    /// calendar date.
    pub fn parse(s: &str) -> Result<Self, StreakError> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|e| StreakError::InvalidDate(format!("'{s}': {e}")))
    }

    /// Build a day key directly from year/month/day (mainly for tests).
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Signed count of calendar days from `self` to `other`.
    ///
    /// Positive when `other` is later. A negative result means the caller
    /// presented days out of chronological order; the engine rejects that
    /// rather than clamping.
    pub fn days_until(self, other: DayKey) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// The day `days` later (negative for earlier), if representable.
    pub fn checked_add_days(self, days: i64) -> Option<DayKey> {
        self.0.checked_add_signed(Duration::days(days)).map(Self)
    }

    /// The Monday of the week containing this day.
    pub fn week_anchor(self) -> DayKey {
        let back = i64::from(self.0.weekday().num_days_from_monday());
        Self(self.0 - Duration::days(back))
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Parse an RFC 3339 timestamp into a UTC instant.
///
/// # Errors
/// Returns [`StreakError::InvalidDate`] if the string cannot be parsed.
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, StreakError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StreakError::InvalidDate(format!("'{s}': {e}")))
}

/// The day keys strictly between `a` (exclusive) and `b` (exclusive),
/// in chronological order. Empty when `b <= a + 1 day`.
pub fn days_strictly_between(a: DayKey, b: DayKey) -> Vec<DayKey> {
    a.0.iter_days()
        .skip(1)
        .take_while(|d| *d < b.0)
        .map(DayKey)
        .collect()
}
