//! Read-only projection of a continuity record for presentation.

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::daykey::DayKey;
use crate::error::{Result, StreakError};
use crate::record::ContinuityRecord;
use crate::replenish;
use crate::store::ContinuityStore;

/// What the display layer gets to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuityProjection {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_entry_date: Option<DayKey>,
    pub hotsure_remaining: u8,
    pub hotsure_used_count: usize,
}

impl From<&ContinuityRecord> for ContinuityProjection {
    fn from(record: &ContinuityRecord) -> Self {
        Self {
            current_streak: record.current_streak,
            longest_streak: record.longest_streak,
            last_entry_date: record.last_entry_date,
            hotsure_remaining: record.hotsure_remaining,
            hotsure_used_count: record.hotsure_used_dates.len(),
        }
    }
}

/// Pool-facing view of a record, for replenishment tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStatus {
    pub week_anchor: DayKey,
    pub hotsure_remaining: u8,
    pub hotsure_used_dates: Vec<DayKey>,
}

impl From<&ContinuityRecord> for PoolStatus {
    fn from(record: &ContinuityRecord) -> Self {
        Self {
            week_anchor: record.week_anchor,
            hotsure_remaining: record.hotsure_remaining,
            hotsure_used_dates: record.hotsure_used_dates.iter().copied().collect(),
        }
    }
}

/// Read side of the engine.
///
/// Replenishment is applied virtually against the clock's current day, so
/// a record nobody has updated since last week still renders a fresh token
/// pool. Nothing is persisted here; the durable refill happens lazily on
/// the next real update or sweep.
pub struct QueryService<S, C> {
    store: S,
    clock: C,
}

impl<S: ContinuityStore, C: Clock> QueryService<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// # Errors
    /// [`StreakError::NotFound`] when the user has no record; queries do
    /// not lazily create one.
    pub fn get(&self, user_id: &str) -> Result<ContinuityProjection> {
        Ok(ContinuityProjection::from(&self.current_record(user_id)?))
    }

    /// The hotsure pool as of the clock's current week.
    ///
    /// # Errors
    /// [`StreakError::NotFound`] when the user has no record.
    pub fn pool(&self, user_id: &str) -> Result<PoolStatus> {
        Ok(PoolStatus::from(&self.current_record(user_id)?))
    }

    fn current_record(&self, user_id: &str) -> Result<ContinuityRecord> {
        let stored = self
            .store
            .get(user_id)?
            .ok_or_else(|| StreakError::NotFound(user_id.to_string()))?;

        let mut record = stored.record;
        replenish::apply(&mut record, self.clock.today());
        Ok(record)
    }
}
