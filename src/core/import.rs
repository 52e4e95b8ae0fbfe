//! Expense history read from a CSV export.
//!
//! The file needs `Amount`, `Category` and `Date` columns (any order, any
//! case). Amounts may carry thousands separators and dates may be
//! `DD/MM/YYYY`. Rows missing one of the three values, or holding one that
//! does not parse, are skipped and counted.

use crate::{
    core::{
        forecast::{CategoryForecast, ForecastSettings, forecast_by_category},
        money::to_minor_units,
    },
    errors::{Error, Result},
    models::{Expense, UNKNOWN_PURPOSE, parse_record_date},
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Owner recorded on imported rows.
pub const IMPORT_OWNER: &str = "import";

/// Rows accepted from one CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedExpenses {
    /// Accepted rows in file order, numbered from 1
    pub expenses: Vec<Expense>,
    /// Data rows that were dropped
    pub skipped: usize,
}

/// Parses an amount such as `1,200.50`.
///
/// Returns `None` for blanks, negatives and values that cannot be stored.
#[must_use]
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned = raw.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    let amount = Decimal::from_str(cleaned).ok()?;
    if amount.is_sign_negative() {
        return None;
    }
    to_minor_units(amount).map(|_| amount)
}

struct Columns {
    amount: usize,
    category: usize,
    date: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| Error::Import {
                    message: format!("missing {name} column"),
                })
        };
        Ok(Self {
            amount: find("Amount")?,
            category: find("Category")?,
            date: find("Date")?,
        })
    }
}

/// Reads expenses from CSV data with a header row.
pub fn read_expenses<R: Read>(reader: R) -> Result<ImportedExpenses> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::locate(rdr.headers()?)?;
    let imported_at = Utc::now();
    let mut expenses = Vec::new();
    let mut skipped = 0;

    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let amount = record.get(columns.amount).and_then(parse_amount);
        let category = record.get(columns.category).filter(|c| !c.is_empty());
        let date = record.get(columns.date).and_then(parse_record_date);

        let (Some(amount), Some(category), Some(date)) = (amount, category, date) else {
            debug!(row = row + 1, "Skipping incomplete CSV row");
            skipped += 1;
            continue;
        };

        expenses.push(Expense {
            id: i64::try_from(row + 1).unwrap_or(i64::MAX),
            amount,
            category: category.to_string(),
            purpose: UNKNOWN_PURPOSE.to_string(),
            description: None,
            date: date.format("%Y-%m-%d").to_string(),
            owner_id: IMPORT_OWNER.to_string(),
            recurring: false,
            frequency: None,
            created_at: imported_at,
        });
    }

    info!(accepted = expenses.len(), skipped, "Read CSV expenses");
    Ok(ImportedExpenses { expenses, skipped })
}

/// Reads expenses from the CSV file at `path`.
pub fn read_expenses_from_path<P: AsRef<Path>>(path: P) -> Result<ImportedExpenses> {
    let file = std::fs::File::open(path)?;
    read_expenses(file)
}

/// Per-category forecasts for the expenses in a CSV file.
///
/// Fails when no row is usable.
pub fn forecast_from_csv<R: Read>(
    reader: R,
    settings: &ForecastSettings,
) -> Result<Vec<CategoryForecast>> {
    let imported = read_expenses(reader)?;
    if imported.expenses.is_empty() {
        return Err(Error::Import {
            message: "no valid rows; expected Amount, Category and Date columns".to_string(),
        });
    }
    Ok(forecast_by_category(&imported.expenses, settings))
}
