//! Domain records handed to the aggregation engine.
//!
//! These are the owner-facing shapes of the persisted entities: money is a
//! [`Decimal`], the expense date is kept exactly as it was recorded, and
//! nothing derived (such as a budget's spend) lives here.

use crate::core::money::from_minor_units;
use crate::entities::{budget, expense};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label used when an expense was recorded without a purpose.
pub const UNKNOWN_PURPOSE: &str = "Unknown";

/// The two collections held by the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Recorded spend events
    Expenses,
    /// Per-category spending ceilings
    Budgets,
}

impl Collection {
    /// Name of the collection as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expenses => "expenses",
            Self::Budgets => "budgets",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How often a recurring expense repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Every day
    Daily,
    /// Every week
    Weekly,
    /// Every month
    Monthly,
    /// Every year
    Yearly,
}

impl Frequency {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(format!("unknown frequency {other:?}")),
        }
    }
}

/// A single recorded spend event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Store-assigned identifier
    pub id: i64,
    /// Amount spent
    pub amount: Decimal,
    /// Free-text category, matched to budgets after normalizing
    pub category: String,
    /// Sub-label, [`UNKNOWN_PURPOSE`] when none was given
    pub purpose: String,
    /// Optional free text
    pub description: Option<String>,
    /// Raw date as recorded; may not parse (see [`parse_record_date`])
    pub date: String,
    /// Owning user
    pub owner_id: String,
    /// Whether the expense repeats
    pub recurring: bool,
    /// Repeat interval of a recurring expense
    pub frequency: Option<Frequency>,
    /// When the record was created
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Calendar date of the expense, or `None` when the stored date is unreadable.
    #[must_use]
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        parse_record_date(&self.date)
    }
}

impl From<expense::Model> for Expense {
    fn from(model: expense::Model) -> Self {
        Self {
            id: model.id,
            amount: from_minor_units(model.amount_minor),
            category: model.category,
            purpose: model
                .purpose
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_PURPOSE.to_string()),
            description: model.description,
            date: model.date,
            owner_id: model.owner_id,
            recurring: model.recurring,
            // An unrecognised stored frequency is dropped rather than failing the read
            frequency: model.frequency.and_then(|f| f.parse().ok()),
            created_at: model.created_at,
        }
    }
}

/// A user-defined spending ceiling for one category.
///
/// The amount spent against it is always derived from expenses by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Store-assigned identifier
    pub id: i64,
    /// Category the budget applies to
    pub category: String,
    /// Spending ceiling
    pub limit: Decimal,
    /// Owning user
    pub owner_id: String,
    /// When the budget was created
    pub created_at: DateTime<Utc>,
}

impl From<budget::Model> for Budget {
    fn from(model: budget::Model) -> Self {
        Self {
            id: model.id,
            category: model.category,
            limit: from_minor_units(model.limit_minor),
            owner_id: model.owner_id,
            created_at: model.created_at,
        }
    }
}

/// Input for recording a new expense.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewExpense {
    /// Positive amount with at most two decimal places
    pub amount: Decimal,
    /// Left empty to derive one from `description`
    pub category: Option<String>,
    /// Optional sub-label
    pub purpose: Option<String>,
    /// Free text, also used to pick a category
    pub description: Option<String>,
    /// Defaults to the creation time when absent
    pub date: Option<String>,
    /// Whether the expense repeats
    pub recurring: bool,
    /// Repeat interval, only kept for recurring expenses
    pub frequency: Option<Frequency>,
}

impl NewExpense {
    /// Shorthand for the common case of an amount, a category and a date.
    #[must_use]
    pub fn new(amount: Decimal, category: &str, date: &str) -> Self {
        Self {
            amount,
            category: Some(category.to_string()),
            date: Some(date.to_string()),
            ..Self::default()
        }
    }
}

/// Input for creating a budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBudget {
    /// Non-blank category name
    pub category: String,
    /// Positive ceiling with at most two decimal places
    pub limit: Decimal,
}

impl NewBudget {
    /// Budget input for `category` capped at `limit`.
    #[must_use]
    pub fn new(category: &str, limit: Decimal) -> Self {
        Self {
            category: category.to_string(),
            limit,
        }
    }
}

/// Parses the date of a stored record.
///
/// Accepts RFC 3339 timestamps (the calendar day is taken in the offset the
/// timestamp was written with), naive ISO timestamps, plain `YYYY-MM-DD`
/// dates and `DD/MM/YYYY` dates. Anything else yields `None`.
#[must_use]
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
}
