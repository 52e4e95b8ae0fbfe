/// Database configuration and connection management
pub mod database;

/// Owner identity from environment variables
pub mod identity;

/// Saved owner preferences (savings goal, currency)
pub mod preferences;

/// Application configuration loading from paisa.toml
pub mod settings;
