//! Expense entity - One recorded spend event owned by a single user.
//!
//! Amounts are stored as integer minor units (hundredths) so that values read
//! back exactly as they were written. The `date` column keeps the raw string
//! the client supplied; records with unreadable dates are still stored.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    /// Store-assigned identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identity of the owning user; every query is scoped by it
    pub owner_id: String,
    /// Amount in minor currency units (e.g. paise, cents)
    pub amount_minor: i64,
    /// Free-text category, matched to budgets after trimming and lowercasing
    pub category: String,
    /// Optional sub-label
    pub purpose: Option<String>,
    /// Optional free-text description
    pub description: Option<String>,
    /// When the expense happened, as recorded (ISO 8601 expected)
    pub date: String,
    /// Whether the expense repeats
    pub recurring: bool,
    /// `"daily"`, `"weekly"`, `"monthly"` or `"yearly"` for recurring expenses
    pub frequency: Option<String>,
    /// When the record was created
    pub created_at: DateTimeUtc,
}

/// Expenses reference budgets only through the category string, not a key
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
