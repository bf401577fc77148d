use keizoku_core::{Config, SqliteStore};

/// Open the SQLite store at the configured path.
pub fn open_store(config: &Config) -> Result<SqliteStore, Box<dyn std::error::Error>> {
    Ok(SqliteStore::open_at(config.database_path()?)?)
}
