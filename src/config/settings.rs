//! Application configuration loading from paisa.toml
//!
//! The file is optional. Every table and key has a default, so an absent file
//! or an empty one both produce the stock configuration.

use crate::core::forecast::ForecastSettings;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "paisa.toml";

/// Where preferences live unless the config says otherwise.
pub const DEFAULT_PREFERENCES_PATH: &str = "data/preferences.toml";

/// Configuration structure representing the entire paisa.toml file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Forecast tunables from the `[forecast]` table
    pub forecast: ForecastSettings,
    /// File holding the owner's saved preferences
    pub preferences_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            forecast: ForecastSettings::default(),
            preferences_path: PathBuf::from(DEFAULT_PREFERENCES_PATH),
        }
    }
}

/// Loads the application configuration from a TOML file.
///
/// A missing file yields [`AppConfig::default`].
///
/// # Errors
/// Returns an error if:
/// - The file exists but cannot be read
/// - The TOML syntax is invalid
/// - A value has the wrong type
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        info!(path = %path.display(), "No config file found, using defaults");
        return Ok(AppConfig::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    let config: AppConfig = toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path.display()),
    })?;
    debug!(?config, "Loaded configuration");
    Ok(config)
}

/// Loads the configuration from the default location (./paisa.toml)
pub fn load_default_config() -> Result<AppConfig> {
    load_config(DEFAULT_CONFIG_PATH)
}
