//! Persistence contract for continuity records.
//!
//! The engine never holds records as ambient state; every operation loads
//! through a store handle and writes back through a compare-and-swap save.
//! Optimistic versioning is what linearizes concurrent updates for a user:
//! a save carrying a stale version is rejected with
//! [`StoreError::VersionConflict`] and the caller reloads and retries.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::StoreError;
use crate::record::ContinuityRecord;

/// A record together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stored {
    pub record: ContinuityRecord,
    pub version: u64,
}

/// One record per user with atomic read-modify-write.
pub trait ContinuityStore {
    /// Fetch the record and its current version, if one exists.
    fn get(&self, user_id: &str) -> Result<Option<Stored>, StoreError>;

    /// Save with compare-and-swap semantics. `expected_version` is `None`
    /// when creating a record for a new user. Returns the new version.
    ///
    /// # Errors
    /// [`StoreError::VersionConflict`] when the stored version (or the
    /// row's existence) no longer matches; the caller must reload and
    /// retry rather than overwrite.
    fn save(
        &self,
        user_id: &str,
        record: &ContinuityRecord,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError>;

    /// All user ids with a stored record, for the replenishment sweep.
    fn user_ids(&self) -> Result<Vec<String>, StoreError>;
}

impl<T: ContinuityStore + ?Sized> ContinuityStore for &T {
    fn get(&self, user_id: &str) -> Result<Option<Stored>, StoreError> {
        (**self).get(user_id)
    }

    fn save(
        &self,
        user_id: &str,
        record: &ContinuityRecord,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError> {
        (**self).save(user_id, record, expected_version)
    }

    fn user_ids(&self) -> Result<Vec<String>, StoreError> {
        (**self).user_ids()
    }
}

/// Map-backed store for tests and embedding.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Stored>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContinuityStore for MemoryStore {
    fn get(&self, user_id: &str) -> Result<Option<Stored>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records.get(user_id).cloned())
    }

    fn save(
        &self,
        user_id: &str,
        record: &ContinuityRecord,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError> {
        let mut records = self.records.lock().unwrap();
        let current = records.get(user_id).map(|s| s.version);
        if current != expected_version {
            return Err(StoreError::VersionConflict {
                user: user_id.to_string(),
                expected: expected_version,
            });
        }
        let version = expected_version.unwrap_or(0) + 1;
        records.insert(
            user_id.to_string(),
            Stored {
                record: record.clone(),
                version,
            },
        );
        Ok(version)
    }

    fn user_ids(&self) -> Result<Vec<String>, StoreError> {
        let records = self.records.lock().unwrap();
        let mut ids: Vec<String> = records.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
