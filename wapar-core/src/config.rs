//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/wapar/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/wapar/` (~/.config/wapar/)
//! - Data: `$XDG_DATA_HOME/wapar/` (~/.local/share/wapar/)
//! - State/Logs: `$XDG_STATE_HOME/wapar/` (~/.local/state/wapar/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Snapshot store configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Snapshot store retention configuration.
///
/// One `SnapshotStore` instance is configured by one of these; multiple
/// stores with different configs may coexist (tests rely on this).
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Hard cap on retained snapshots
    #[serde(default = "default_max_snapshots")]
    pub max_snapshots: usize,

    /// Snapshots older than this many days are evicted
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,

    /// Key the serialized snapshot list is stored under
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            max_snapshots: default_max_snapshots(),
            retention_days: default_retention_days(),
            storage_key: default_storage_key(),
        }
    }
}

fn default_max_snapshots() -> usize {
    500
}

fn default_retention_days() -> i64 {
    90
}

fn default_storage_key() -> String {
    "wapar_historical_data".to_string()
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/wapar/config.toml` (~/.config/wapar/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("wapar").join("config.toml")
    }

    /// Returns the data directory path (for the snapshot store)
    ///
    /// `$XDG_DATA_HOME/wapar/` (~/.local/share/wapar/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("wapar")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/wapar/` (~/.local/state/wapar/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("wapar")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/wapar/wapar.log` (~/.local/state/wapar/wapar.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("wapar.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage.max_snapshots, 500);
        assert_eq!(config.storage.retention_days, 90);
        assert_eq!(config.storage.storage_key, "wapar_historical_data");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[storage]
max_snapshots = 50
retention_days = 14

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.storage.max_snapshots, 50);
        assert_eq!(config.storage.retention_days, 14);
        // unset keys fall back to defaults
        assert_eq!(config.storage.storage_key, "wapar_historical_data");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.storage.max_snapshots, 500);
        assert_eq!(config.logging.level, "info");
    }
}
