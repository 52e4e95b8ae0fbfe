//! Database configuration module.
//!
//! Handles the `SQLite` connection and table creation using `SeaORM`. Tables are
//! generated from the entity definitions with `Schema::create_table_from_entity`
//! so the schema always matches the Rust structs.

use crate::entities::{Budget, Expense};
use crate::errors::{Error, Result};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use tracing::{debug, info};

/// Environment variable naming the database.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/paisa.sqlite?mode=rwc";

/// Gets the database URL from the environment or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var(DATABASE_URL_VAR).unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// File path inside a `sqlite://` URL, if it points at a file.
fn sqlite_file_path(url: &str) -> Option<&Path> {
    let rest = url.strip_prefix("sqlite://")?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path.contains(":memory:") {
        None
    } else {
        Some(Path::new(path))
    }
}

/// Connects to `database_url`, creating the parent directory of a `SQLite`
/// file when it does not exist yet.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    let missing_dir = sqlite_file_path(database_url)
        .and_then(Path::parent)
        .filter(|parent| !parent.as_os_str().is_empty() && !parent.exists());
    if let Some(parent) = missing_dir {
        std::fs::create_dir_all(parent).map_err(|e| Error::Config {
            message: format!("Failed to create database directory {}: {e}", parent.display()),
        })?;
        debug!(path = %parent.display(), "Created database directory");
    }

    let db = Database::connect(database_url).await?;
    info!("Connected to database");
    Ok(db)
}

/// Creates the `expenses` and `budgets` tables when they are missing.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut expense_table = schema.create_table_from_entity(Expense);
    let mut budget_table = schema.create_table_from_entity(Budget);

    expense_table.if_not_exists();
    budget_table.if_not_exists();

    db.execute(builder.build(&expense_table)).await?;
    db.execute(builder.build(&budget_table)).await?;

    Ok(())
}
