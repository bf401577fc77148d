//! The gap/token/reset transition at the heart of the engine.
//!
//! [`consume`] is a pure state transition: given a record whose pool has
//! already been replenished for the entry's week, and the canonical day of
//! a newly recorded activity, it produces the next record and an
//! [`Outcome`] describing what happened. Missed days between the last
//! entry and the new one each cost one hotsure token; when the gap costs
//! more tokens than remain, the streak resets to 1.

use serde::{Deserialize, Serialize};

use crate::daykey::{days_strictly_between, DayKey};
use crate::error::StreakError;
use crate::record::ContinuityRecord;

/// What a single entry did to the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// The entry's day is already the last recorded day; nothing changed.
    /// Guarantees idempotence against duplicate or retried submissions.
    SameDayNoop,

    /// First-ever entry for this user; streak begins at 1.
    Started,

    /// Exactly one day after the last entry; streak grew by 1.
    Extended,

    /// The gap's missed days were all forgiven by hotsure tokens.
    CoveredByHotsure {
        /// Tokens consumed (one per missed day)
        covered: u32,
    },

    /// The gap cost more tokens than remained; the streak restarted at 1.
    Reset {
        /// Days missed between the last entry and this one
        missed: u32,
        /// The leading missed days the remaining tokens could still have
        /// covered before the pool ran dry
        coverable: Vec<DayKey>,
    },
}

/// Apply one recorded entry to the record.
///
/// Callers must have run replenishment for `entry_day`'s week first.
///
/// # Errors
/// Returns [`StreakError::InvalidDate`] when `entry_day` precedes the last
/// recorded day; the engine never reorders history. The record is returned
/// untouched in spirit: on error nothing should be persisted.
pub fn consume(
    mut record: ContinuityRecord,
    entry_day: DayKey,
) -> Result<(ContinuityRecord, Outcome), StreakError> {
    let Some(last) = record.last_entry_date else {
        record.current_streak = 1;
        record.longest_streak = record.longest_streak.max(1);
        record.last_entry_date = Some(entry_day);
        return Ok((record, Outcome::Started));
    };

    if entry_day == last {
        return Ok((record, Outcome::SameDayNoop));
    }

    let gap = last.days_until(entry_day);
    if gap < 0 {
        return Err(StreakError::InvalidDate(format!(
            "entry day {entry_day} precedes last recorded day {last}"
        )));
    }

    if gap == 1 {
        record.current_streak += 1;
        record.longest_streak = record.longest_streak.max(record.current_streak);
        record.last_entry_date = Some(entry_day);
        return Ok((record, Outcome::Extended));
    }

    // gap > 1: the days strictly between cost one token each,
    // consumed in chronological order.
    let missed = days_strictly_between(last, entry_day);
    let needed = missed.len() as u32;

    if needed <= u32::from(record.hotsure_remaining) {
        record.hotsure_remaining -= needed as u8;
        record.hotsure_used_dates.extend(missed.iter().copied());
        // Only the newly recorded day lengthens the streak; forgiven days
        // preserve continuity but do not count themselves.
        record.current_streak += 1;
        record.longest_streak = record.longest_streak.max(record.current_streak);
        record.last_entry_date = Some(entry_day);
        return Ok((record, Outcome::CoveredByHotsure { covered: needed }));
    }

    // Not enough tokens: the streak breaks. The pool drains on the days it
    // could still have covered, and the record restarts at 1. The broken
    // streak is already reflected in longest_streak.
    let coverable: Vec<DayKey> = missed
        .iter()
        .copied()
        .take(usize::from(record.hotsure_remaining))
        .collect();
    record.hotsure_remaining = 0;
    record.current_streak = 1;
    record.last_entry_date = Some(entry_day);
    Ok((
        record,
        Outcome::Reset {
            missed: needed,
            coverable,
        },
    ))
}
