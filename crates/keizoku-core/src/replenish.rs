//! Weekly hotsure pool replenishment.
//!
//! The token pool refills to [`HOTSURE_MAX`](crate::record::HOTSURE_MAX)
//! once per week, on the Monday boundary in the bucketing offset. The
//! anchor comparison makes the refill idempotent within a window, so it
//! can run on every update and again from a periodic sweep without
//! double-granting tokens.

use serde::{Deserialize, Serialize};

use crate::daykey::DayKey;
use crate::error::{StoreError, StreakError};
use crate::record::{ContinuityRecord, HOTSURE_MAX};
use crate::store::ContinuityStore;

/// Refill the pool if `today` falls in a later week than the record's
/// anchor. Returns `true` when the record changed.
///
/// Must run before [`consume`](crate::consume::consume) on every update;
/// may also run standalone for users with no activity in the new week.
pub fn apply(record: &mut ContinuityRecord, today: DayKey) -> bool {
    let current_anchor = today.week_anchor();
    if current_anchor == record.week_anchor {
        return false;
    }
    record.hotsure_remaining = HOTSURE_MAX;
    record.hotsure_used_dates.clear();
    record.week_anchor = current_anchor;
    true
}

/// Result of a replenishment sweep across all stored users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepSummary {
    /// Records examined
    pub examined: usize,
    /// Records whose pool was refilled and saved
    pub replenished: usize,
    /// Saves lost to a concurrent entry-triggered update; safe to skip
    /// because that update replenished the same window itself
    pub conflicts: usize,
}

/// Replenish every stored user for `today`, through the versioned save
/// path. A record that loses its save race is skipped, not retried here;
/// the sweep's next scheduled run (or the racing update itself) covers it.
pub fn run_sweep<S: ContinuityStore>(store: &S, today: DayKey) -> Result<SweepSummary, StreakError> {
    let mut summary = SweepSummary::default();
    for user_id in store.user_ids()? {
        let Some(stored) = store.get(&user_id)? else {
            continue;
        };
        summary.examined += 1;

        let mut record = stored.record;
        if !apply(&mut record, today) {
            continue;
        }
        match store.save(&user_id, &record, Some(stored.version)) {
            Ok(_) => summary.replenished += 1,
            Err(StoreError::VersionConflict { .. }) => summary.conflicts += 1,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn day(s: &str) -> DayKey {
        DayKey::parse(s).unwrap()
    }

    fn spent_record(anchor: &str) -> ContinuityRecord {
        let mut record = ContinuityRecord::fresh(day(anchor));
        record.hotsure_remaining = 0;
        record.hotsure_used_dates.insert(day("2024-01-02"));
        record.hotsure_used_dates.insert(day("2024-01-04"));
        record
    }

    #[test]
    fn test_same_window_is_noop() {
        let mut record = spent_record("2024-01-01");
        // Friday of the same week.
        assert!(!apply(&mut record, day("2024-01-05")));
        assert_eq!(record.hotsure_remaining, 0);
        assert_eq!(record.hotsure_used_dates.len(), 2);
        assert_eq!(record.week_anchor, day("2024-01-01"));
    }

    #[test]
    fn test_new_window_refills_and_clears() {
        let mut record = spent_record("2024-01-01");
        assert!(apply(&mut record, day("2024-01-09")));
        assert_eq!(record.hotsure_remaining, HOTSURE_MAX);
        assert!(record.hotsure_used_dates.is_empty());
        assert_eq!(record.week_anchor, day("2024-01-08"));
    }

    #[test]
    fn test_replenish_is_idempotent_within_window() {
        let mut record = spent_record("2024-01-01");
        assert!(apply(&mut record, day("2024-01-08")));
        let after_first = record.clone();

        // Re-applying later in the same week changes nothing.
        assert!(!apply(&mut record, day("2024-01-10")));
        assert_eq!(record, after_first);
    }

    #[test]
    fn test_sweep_refills_stale_records_only() {
        let store = MemoryStore::new();
        store
            .save("stale", &spent_record("2024-01-01"), None)
            .unwrap();
        store
            .save("current", &ContinuityRecord::fresh(day("2024-01-08")), None)
            .unwrap();

        let summary = run_sweep(&store, day("2024-01-10")).unwrap();
        assert_eq!(summary.examined, 2);
        assert_eq!(summary.replenished, 1);
        assert_eq!(summary.conflicts, 0);

        let stale = store.get("stale").unwrap().unwrap();
        assert_eq!(stale.record.hotsure_remaining, HOTSURE_MAX);
        assert!(stale.record.hotsure_used_dates.is_empty());
        assert_eq!(stale.version, 2);

        // Untouched record keeps its version.
        assert_eq!(store.get("current").unwrap().unwrap().version, 1);
    }
}
