//! Core error types for keizoku-core.
//!
//! Business failures are plain enum variants the caller can match on;
//! storage failures wrap the underlying driver errors. Nothing here is
//! thrown for expected control flow -- a same-day re-entry, for example,
//! is an [`Outcome`](crate::consume::Outcome), not an error.

use std::path::PathBuf;
use thiserror::Error;

/// Engine-level errors surfaced to collaborators.
#[derive(Error, Debug)]
pub enum StreakError {
    /// No continuity record exists for the user (lookup APIs only;
    /// entry recording lazily creates records instead).
    #[error("no continuity record for user '{0}'")]
    NotFound(String),

    /// The timestamp or day key could not be parsed, or an entry was
    /// dated before the last recorded day. Raised before any mutation.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Persistence failure, including conflict retries exhausted.
    /// Transient from the caller's perspective; the whole operation is
    /// safe to repeat.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying SQLite failure
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A record column could not be encoded or decoded
    #[error("failed to encode record: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored row holds data the engine cannot interpret
    #[error("corrupt record for user '{user}': {message}")]
    Corrupt { user: String, message: String },

    /// Compare-and-swap save lost against a concurrent writer
    #[error("version conflict for user '{user}' (expected {expected:?})")]
    VersionConflict {
        user: String,
        expected: Option<u64>,
    },

    /// Every reload-and-retry attempt lost a save race
    #[error("gave up after {attempts} conflicting save attempts for user '{user}'")]
    RetriesExhausted { user: String, attempts: u32 },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("failed to parse configuration: {0}")]
    ParseFailed(String),
}

pub type Result<T, E = StreakError> = std::result::Result<T, E>;
