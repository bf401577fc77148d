//! Entry recording use case.
//!
//! Orchestrates one full update: load the record (creating the default for
//! a first-time user), replenish the pool for the entry's week, run the
//! consumption transition, and write back through the versioned save. A
//! save that loses against a concurrent writer restarts the sequence from
//! the reload, so no partial outcome is ever persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::consume::{consume, Outcome};
use crate::daykey::DayKey;
use crate::error::{Result, StoreError};
use crate::record::ContinuityRecord;
use crate::replenish;
use crate::store::ContinuityStore;

/// Save attempts per entry before giving up on a contended record.
pub const DEFAULT_MAX_SAVE_RETRIES: u32 = 3;

/// Projection returned to the activity-recording flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryResult {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub outcome: Outcome,
}

/// Entry-recording front door over a [`ContinuityStore`].
///
/// Stateless between calls; all per-user state lives in the store.
pub struct StreakService<S> {
    store: S,
    max_save_retries: u32,
}

impl<S: ContinuityStore> StreakService<S> {
    pub fn new(store: S) -> Self {
        Self::with_retries(store, DEFAULT_MAX_SAVE_RETRIES)
    }

    pub fn with_retries(store: S, max_save_retries: u32) -> Self {
        Self {
            store,
            max_save_retries: max_save_retries.max(1),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record that an activity happened at `occurred_at` for `user_id`.
    ///
    /// Idempotent for repeated submissions on the same UTC+9 calendar day.
    ///
    /// # Errors
    /// [`StreakError::InvalidDate`](crate::error::StreakError::InvalidDate)
    /// when the entry is dated before the last recorded day, or a store
    /// error when persistence fails (including a contended record whose
    /// retry budget ran out). Either way the previously committed record
    /// is intact.
    pub fn record_entry(&self, user_id: &str, occurred_at: DateTime<Utc>) -> Result<EntryResult> {
        let entry_day = DayKey::from_instant(occurred_at);

        let mut attempts = 0;
        loop {
            let (mut record, expected_version) = match self.store.get(user_id)? {
                Some(stored) => (stored.record, Some(stored.version)),
                None => (ContinuityRecord::fresh(entry_day), None),
            };

            let replenished = replenish::apply(&mut record, entry_day);
            let (next, outcome) = consume(record, entry_day)?;

            // A duplicate delivery that also changed nothing via
            // replenishment has nothing to persist; writing anyway would
            // bump the version and contend with concurrent submissions.
            if outcome == Outcome::SameDayNoop && !replenished {
                return Ok(EntryResult {
                    current_streak: next.current_streak,
                    longest_streak: next.longest_streak,
                    outcome,
                });
            }

            match self.store.save(user_id, &next, expected_version) {
                Ok(_) => {
                    return Ok(EntryResult {
                        current_streak: next.current_streak,
                        longest_streak: next.longest_streak,
                        outcome,
                    })
                }
                Err(StoreError::VersionConflict { .. }) => {
                    attempts += 1;
                    if attempts >= self.max_save_retries {
                        return Err(StoreError::RetriesExhausted {
                            user: user_id.to_string(),
                            attempts,
                        }
                        .into());
                    }
                    // Reload and rerun the whole transition.
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
