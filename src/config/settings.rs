//! TOML-based configuration for Vantage.
//!
//! Example configuration:
//! ```toml
//! [planner]
//! max_cache_columns = 10
//!
//! [registry]
//! path = "./vantage_registry.db"
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Planner limits.
    pub planner: PlannerSettings,

    /// Registry storage.
    pub registry: RegistrySettings,
}

/// Planner limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlannerSettings {
    /// Upper bound on distinct cache columns per view. Caps cache-table
    /// width and extraction cost.
    pub max_cache_columns: usize,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            max_cache_columns: 10,
        }
    }
}

/// Registry storage settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Path to the registry database file.
    pub path: String,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            path: "./vantage_registry.db".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `VANTAGE_CONFIG`
    /// 2. `./vantage.toml`
    ///
    /// Falls back to defaults when no file is found.
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("VANTAGE_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("vantage.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        Ok(Self::default())
    }
}
