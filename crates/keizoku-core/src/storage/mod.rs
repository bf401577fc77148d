mod config;
pub mod sqlite;

pub use config::{Config, EngineConfig, StorageConfig};
pub use sqlite::SqliteStore;
