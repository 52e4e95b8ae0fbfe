//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test records with sensible defaults.

use crate::{
    core::{budget, expense},
    errors::Result,
    models::{Budget, Expense, NewBudget, NewExpense, UNKNOWN_PURPOSE},
    store::Store,
};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Routes tracing output to the test harness. Safe to call more than once.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A [`Store`] over a fresh in-memory database.
pub async fn setup_test_store() -> Result<Store> {
    Ok(Store::new(setup_test_db().await?))
}

/// Input for an expense with an explicit date and nothing optional.
#[must_use]
pub fn new_expense(amount: Decimal, category: &str, date: &str) -> NewExpense {
    NewExpense::new(amount, category, date)
}

/// Records a test expense dated 2025-01-15.
pub async fn create_test_expense(
    db: &DatabaseConnection,
    owner_id: &str,
    amount: Decimal,
    category: &str,
) -> Result<Expense> {
    expense::create_expense(db, owner_id, new_expense(amount, category, "2025-01-15")).await
}

/// Creates a test budget.
pub async fn create_test_budget(
    db: &DatabaseConnection,
    owner_id: &str,
    category: &str,
    limit: Decimal,
) -> Result<Budget> {
    budget::create_budget(db, owner_id, NewBudget::new(category, limit)).await
}

/// In-memory expense for the pure engine functions.
///
/// # Defaults
/// * `owner_id`: "owner"
/// * `purpose`: Unknown
/// * not recurring
#[must_use]
pub fn expense(id: i64, amount: Decimal, category: &str, date: &str) -> Expense {
    Expense {
        id,
        amount,
        category: category.to_string(),
        purpose: UNKNOWN_PURPOSE.to_string(),
        description: None,
        date: date.to_string(),
        owner_id: "owner".to_string(),
        recurring: false,
        frequency: None,
        created_at: Utc.timestamp_opt(0, 0).single().unwrap_or_default(),
    }
}

/// In-memory budget for the pure engine functions.
#[must_use]
pub fn budget(id: i64, category: &str, limit: Decimal) -> Budget {
    Budget {
        id,
        category: category.to_string(),
        limit,
        owner_id: "owner".to_string(),
        created_at: Utc.timestamp_opt(0, 0).single().unwrap_or_default(),
    }
}
