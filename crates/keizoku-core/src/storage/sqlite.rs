//! SQLite-backed continuity store.
//!
//! One row per user. The `version` column carries the optimistic-lock
//! token: creates insert at version 1, updates are guarded by
//! `WHERE version = ?`, and a zero-row update means a concurrent writer
//! got there first.

use std::path::Path;

use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use crate::daykey::DayKey;
use crate::error::StoreError;
use crate::record::ContinuityRecord;
use crate::store::{ContinuityStore, Stored};

/// SQLite database holding one continuity record per user.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the store at the given path, typically
    /// [`Config::database_path`](crate::storage::Config::database_path).
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS continuity (
                user_id             TEXT PRIMARY KEY,
                current_streak      INTEGER NOT NULL,
                longest_streak      INTEGER NOT NULL,
                last_entry_date     TEXT,
                hotsure_remaining   INTEGER NOT NULL,
                hotsure_used_dates  TEXT NOT NULL DEFAULT '[]',
                week_anchor         TEXT NOT NULL,
                version             INTEGER NOT NULL
            );",
        )
    }

    fn corrupt(user_id: &str, message: impl Into<String>) -> StoreError {
        StoreError::Corrupt {
            user: user_id.to_string(),
            message: message.into(),
        }
    }
}

struct Row {
    current_streak: u32,
    longest_streak: u32,
    last_entry_date: Option<String>,
    hotsure_remaining: u8,
    hotsure_used_dates: String,
    week_anchor: String,
    version: u64,
}

fn decode(user_id: &str, row: Row) -> Result<Stored, StoreError> {
    let last_entry_date = row
        .last_entry_date
        .map(|s| DayKey::parse(&s))
        .transpose()
        .map_err(|e| SqliteStore::corrupt(user_id, e.to_string()))?;
    let week_anchor = DayKey::parse(&row.week_anchor)
        .map_err(|e| SqliteStore::corrupt(user_id, e.to_string()))?;
    let hotsure_used_dates = serde_json::from_str(&row.hotsure_used_dates)?;

    Ok(Stored {
        record: ContinuityRecord {
            current_streak: row.current_streak,
            longest_streak: row.longest_streak,
            last_entry_date,
            hotsure_remaining: row.hotsure_remaining,
            hotsure_used_dates,
            week_anchor,
        },
        version: row.version,
    })
}

impl ContinuityStore for SqliteStore {
    fn get(&self, user_id: &str) -> Result<Option<Stored>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT current_streak, longest_streak, last_entry_date,
                        hotsure_remaining, hotsure_used_dates, week_anchor, version
                 FROM continuity WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(Row {
                        current_streak: row.get(0)?,
                        longest_streak: row.get(1)?,
                        last_entry_date: row.get(2)?,
                        hotsure_remaining: row.get(3)?,
                        hotsure_used_dates: row.get(4)?,
                        week_anchor: row.get(5)?,
                        version: row.get(6)?,
                    })
                },
            )
            .optional()?;

        row.map(|r| decode(user_id, r)).transpose()
    }

    fn save(
        &self,
        user_id: &str,
        record: &ContinuityRecord,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError> {
        let last_entry_date = record.last_entry_date.map(|d| d.to_string());
        let used_dates = serde_json::to_string(&record.hotsure_used_dates)?;
        let week_anchor = record.week_anchor.to_string();

        match expected_version {
            None => {
                let result = self.conn.execute(
                    "INSERT INTO continuity
                         (user_id, current_streak, longest_streak, last_entry_date,
                          hotsure_remaining, hotsure_used_dates, week_anchor, version)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1)",
                    params![
                        user_id,
                        record.current_streak,
                        record.longest_streak,
                        last_entry_date,
                        record.hotsure_remaining,
                        used_dates,
                        week_anchor,
                    ],
                );
                match result {
                    Ok(_) => Ok(1),
                    // Row already exists: a concurrent create won.
                    Err(rusqlite::Error::SqliteFailure(e, _))
                        if e.code == ErrorCode::ConstraintViolation =>
                    {
                        Err(StoreError::VersionConflict {
                            user: user_id.to_string(),
                            expected: None,
                        })
                    }
                    Err(e) => Err(e.into()),
                }
            }
            Some(expected) => {
                let changed = self.conn.execute(
                    "UPDATE continuity
                     SET current_streak = ?2, longest_streak = ?3, last_entry_date = ?4,
                         hotsure_remaining = ?5, hotsure_used_dates = ?6, week_anchor = ?7,
                         version = ?8
                     WHERE user_id = ?1 AND version = ?9",
                    params![
                        user_id,
                        record.current_streak,
                        record.longest_streak,
                        last_entry_date,
                        record.hotsure_remaining,
                        used_dates,
                        week_anchor,
                        expected + 1,
                        expected,
                    ],
                )?;
                if changed == 0 {
                    return Err(StoreError::VersionConflict {
                        user: user_id.to_string(),
                        expected: Some(expected),
                    });
                }
                Ok(expected + 1)
            }
        }
    }

    fn user_ids(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_id FROM continuity ORDER BY user_id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::HOTSURE_MAX;
    use std::collections::BTreeSet;

    fn day(s: &str) -> DayKey {
        DayKey::parse(s).unwrap()
    }

    fn sample_record() -> ContinuityRecord {
        ContinuityRecord {
            current_streak: 4,
            longest_streak: 9,
            last_entry_date: Some(day("2024-01-04")),
            hotsure_remaining: 1,
            hotsure_used_dates: BTreeSet::from([day("2024-01-02")]),
            week_anchor: day("2024-01-01"),
        }
    }

    #[test]
    fn test_round_trip() {
        let store = SqliteStore::open_memory().unwrap();
        let version = store.save("aiko", &sample_record(), None).unwrap();
        assert_eq!(version, 1);

        let stored = store.get("aiko").unwrap().unwrap();
        assert_eq!(stored.record, sample_record());
        assert_eq!(stored.version, 1);
    }

    #[test]
    fn test_round_trip_fresh_record() {
        // null last_entry_date and an empty used set survive the trip.
        let store = SqliteStore::open_memory().unwrap();
        let fresh = ContinuityRecord::fresh(day("2024-01-03"));
        store.save("aiko", &fresh, None).unwrap();

        let stored = store.get("aiko").unwrap().unwrap();
        assert_eq!(stored.record, fresh);
        assert_eq!(stored.record.hotsure_remaining, HOTSURE_MAX);
    }

    #[test]
    fn test_versioned_update() {
        let store = SqliteStore::open_memory().unwrap();
        store.save("aiko", &sample_record(), None).unwrap();

        let mut record = sample_record();
        record.current_streak = 5;
        let version = store.save("aiko", &record, Some(1)).unwrap();
        assert_eq!(version, 2);
        assert_eq!(store.get("aiko").unwrap().unwrap().record.current_streak, 5);
    }

    #[test]
    fn test_stale_version_conflicts() {
        let store = SqliteStore::open_memory().unwrap();
        store.save("aiko", &sample_record(), None).unwrap();
        store.save("aiko", &sample_record(), Some(1)).unwrap();

        let err = store.save("aiko", &sample_record(), Some(1));
        assert!(matches!(err, Err(StoreError::VersionConflict { .. })));
    }

    #[test]
    fn test_concurrent_create_conflicts() {
        let store = SqliteStore::open_memory().unwrap();
        store.save("aiko", &sample_record(), None).unwrap();

        let err = store.save("aiko", &sample_record(), None);
        assert!(matches!(
            err,
            Err(StoreError::VersionConflict { expected: None, .. })
        ));
    }

    #[test]
    fn test_update_missing_row_conflicts() {
        let store = SqliteStore::open_memory().unwrap();
        let err = store.save("aiko", &sample_record(), Some(3));
        assert!(matches!(err, Err(StoreError::VersionConflict { .. })));
    }

    #[test]
    fn test_user_ids_sorted() {
        let store = SqliteStore::open_memory().unwrap();
        store.save("yuki", &sample_record(), None).unwrap();
        store.save("aiko", &sample_record(), None).unwrap();
        assert_eq!(store.user_ids().unwrap(), vec!["aiko", "yuki"]);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keizoku.db");
        {
            let store = SqliteStore::open_at(&path).unwrap();
            store.save("aiko", &sample_record(), None).unwrap();
        }
        let store = SqliteStore::open_at(&path).unwrap();
        let stored = store.get("aiko").unwrap().unwrap();
        assert_eq!(stored.record, sample_record());
    }
}
