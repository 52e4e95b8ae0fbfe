//! Owner preferences persisted between runs.
//!
//! Preferences are a small TOML file holding the savings goal and the display
//! currency. Reading a file that does not exist gives the defaults.

use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Display currency used until the owner picks one.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Saved owner settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Target amount to save overall
    pub savings_goal: Decimal,
    /// ISO currency code used when formatting amounts
    pub currency: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            savings_goal: Decimal::ZERO,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

/// Reads preferences from `path`, falling back to defaults when it is absent.
pub fn load_preferences<P: AsRef<Path>>(path: P) -> Result<Preferences> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(path = %path.display(), "No saved preferences, using defaults");
        return Ok(Preferences::default());
    }

    let contents = std::fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse preferences {}: {e}", path.display()),
    })
}

/// Writes preferences to `path`, creating its directory if needed.
pub fn save_preferences<P: AsRef<Path>>(path: P, preferences: &Preferences) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string(preferences).map_err(|e| Error::Config {
        message: format!("Failed to serialize preferences: {e}"),
    })?;
    std::fs::write(path, contents)?;
    info!(path = %path.display(), "Saved preferences");
    Ok(())
}
