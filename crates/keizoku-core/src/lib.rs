//! # Keizoku Core Library
//!
//! This library provides the continuity-tracking engine behind Keizoku: a
//! per-user running count of consecutive activity days ("streak"), with a
//! small weekly pool of forgiveness tokens ("hotsure") that let occasional
//! missed days pass without breaking the streak. It follows a CLI-first
//! philosophy: every operation is available through the standalone CLI
//! binary, and any other surface is a thin layer over this library.
//!
//! ## Architecture
//!
//! - **Day bucketing**: timestamps reduce to calendar-day keys in a fixed
//!   UTC+9 offset before the engine sees them
//! - **Pure transitions**: replenishment and consumption are pure
//!   functions over the per-user record
//! - **Versioned storage**: records load and save through a
//!   compare-and-swap store contract; conflicting writers reload and retry
//! - **Injected clock**: "today" comes from a [`Clock`], so tests drive
//!   arbitrary day sequences deterministically
//!
//! ## Key Components
//!
//! - [`StreakService`]: records activity entries (the update path)
//! - [`QueryService`]: read-only projections with virtual replenishment
//! - [`ContinuityStore`]: persistence contract, with [`SqliteStore`] and
//!   [`MemoryStore`] implementations
//! - [`consume`](consume::consume): the gap/token/reset transition

pub mod clock;
pub mod consume;
pub mod daykey;
pub mod error;
pub mod query;
pub mod record;
pub mod replenish;
pub mod service;
pub mod storage;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use consume::Outcome;
pub use daykey::DayKey;
pub use error::{ConfigError, StoreError, StreakError};
pub use query::{ContinuityProjection, PoolStatus, QueryService};
pub use record::{ContinuityRecord, HOTSURE_MAX};
pub use replenish::SweepSummary;
pub use service::{EntryResult, StreakService};
pub use storage::{Config, SqliteStore};
pub use store::{ContinuityStore, MemoryStore, Stored};
