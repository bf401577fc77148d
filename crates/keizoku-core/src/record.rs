//! The per-user continuity record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::daykey::DayKey;

/// Maximum hotsure tokens held at once; the pool refills to this value
/// each week.
pub const HOTSURE_MAX: u8 = 2;

/// Per-user continuity state, owned exclusively by this engine.
///
/// One record per user, keyed by the user identifier at the store
/// boundary. Mutated only by entry consumption and weekly replenishment;
/// never deleted while the user exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuityRecord {
    /// Consecutive days covered (recorded or hotsure-covered) ending at
    /// `last_entry_date`.
    pub current_streak: u32,

    /// Historical maximum of `current_streak`; never decreases.
    pub longest_streak: u32,

    /// Canonical day of the most recent recorded activity.
    pub last_entry_date: Option<DayKey>,

    /// Unused forgiveness tokens in the current week window,
    /// in `0..=HOTSURE_MAX`.
    pub hotsure_remaining: u8,

    /// Days forgiven within the current week window; cleared on
    /// replenishment. Chronologically ordered.
    pub hotsure_used_dates: BTreeSet<DayKey>,

    /// Monday-aligned day marking the start of the current token window.
    pub week_anchor: DayKey,
}

impl ContinuityRecord {
    /// Default record lazily created on a user's first access.
    pub fn fresh(today: DayKey) -> Self {
        Self {
            current_streak: 0,
            longest_streak: 0,
            last_entry_date: None,
            hotsure_remaining: HOTSURE_MAX,
            hotsure_used_dates: BTreeSet::new(),
            week_anchor: today.week_anchor(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_defaults() {
        let today = DayKey::parse("2024-01-03").unwrap();
        let record = ContinuityRecord::fresh(today);

        assert_eq!(record.current_streak, 0);
        assert_eq!(record.longest_streak, 0);
        assert_eq!(record.last_entry_date, None);
        assert_eq!(record.hotsure_remaining, HOTSURE_MAX);
        assert!(record.hotsure_used_dates.is_empty());
        assert_eq!(record.week_anchor, DayKey::parse("2024-01-01").unwrap());
    }

    #[test]
    fn test_record_json_round_trip() {
        let mut record = ContinuityRecord::fresh(DayKey::parse("2024-01-03").unwrap());
        record.current_streak = 4;
        record.longest_streak = 9;
        record.last_entry_date = Some(DayKey::parse("2024-01-03").unwrap());
        record
            .hotsure_used_dates
            .insert(DayKey::parse("2024-01-02").unwrap());
        record.hotsure_remaining = 1;

        let json = serde_json::to_string(&record).unwrap();
        let back: ContinuityRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
