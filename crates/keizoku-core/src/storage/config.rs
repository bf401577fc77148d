//! TOML-based application configuration.
//!
//! Stores operational settings:
//! - Database location override
//! - Save-retry budget for contended records
//!
//! Configuration lives in `~/.config/keizoku/` (or `keizoku-dev/` when
//! `KEIZOKU_ENV=dev`), alongside the default database.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::service::DEFAULT_MAX_SAVE_RETRIES;

/// Storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Explicit database path; defaults to `<data dir>/keizoku.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Save attempts per entry before a contended record gives up.
    #[serde(default = "default_max_save_retries")]
    pub max_save_retries: u32,
}

fn default_max_save_retries() -> u32 {
    DEFAULT_MAX_SAVE_RETRIES
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_save_retries: default_max_save_retries(),
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/keizoku/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

impl Config {
    /// Load the configuration, falling back to defaults when the file
    /// doesn't exist yet.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Write the configuration back to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })
    }

    /// Resolved database path.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.storage.path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("keizoku.db")),
        }
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// The per-environment config directory, created on first use.
    /// `KEIZOKU_ENV=dev` switches to a separate development directory.
    fn config_dir() -> Result<PathBuf, ConfigError> {
        let name = match std::env::var("KEIZOKU_ENV").as_deref() {
            Ok("dev") => "keizoku-dev",
            _ => "keizoku",
        };
        let dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join(name);

        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::LoadFailed {
            path: dir.clone(),
            message: e.to_string(),
        })?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage.path, None);
        assert_eq!(config.engine.max_save_retries, DEFAULT_MAX_SAVE_RETRIES);
    }

    #[test]
    fn test_partial_toml_uses_field_defaults() {
        let config: Config = toml::from_str(
            r#"
            [storage]
            path = "/tmp/keizoku-test.db"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.storage.path,
            Some(PathBuf::from("/tmp/keizoku-test.db"))
        );
        assert_eq!(config.engine.max_save_retries, DEFAULT_MAX_SAVE_RETRIES);
    }

    #[test]
    fn test_default_database_path_is_in_config_dir() {
        let config = Config::default();
        let path = config.database_path().unwrap();
        assert!(path.ends_with("keizoku.db"));
        // The directory exists after resolution.
        assert!(path.parent().unwrap().is_dir());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.storage.path = Some(PathBuf::from("/var/lib/keizoku/db.sqlite"));
        config.engine.max_save_retries = 5;

        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.storage.path, config.storage.path);
        assert_eq!(back.engine.max_save_retries, 5);
    }
}
