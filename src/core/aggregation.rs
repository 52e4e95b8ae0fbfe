//! Budget/expense aggregation.
//!
//! Every view that shows spend against budgets goes through these functions so
//! that category matching, totals and savings are computed one way only. The
//! functions are pure: no I/O, no hidden state, same input gives same output.
//!
//! Malformed records never cause an error here. An expense with a negative
//! amount is left out of every sum, an expense or budget with a blank category
//! never matches anything, and an expense whose date cannot be read is left
//! out of the monthly buckets but still counts toward totals.

use crate::errors::Error;
use crate::models::{Budget, Expense};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Lowercases and trims a category so it can be used as a join key.
#[must_use]
pub fn normalize_category(category: &str) -> String {
    category.trim().to_lowercase()
}

/// Returns `part / whole * 100`, or zero when `whole` is not positive.
///
/// A ratio too large for a `Decimal` saturates at `Decimal::MAX` (or
/// `Decimal::MIN` for a negative `part`).
#[must_use]
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(if part.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
}

pub(crate) fn is_countable(expense: &Expense) -> bool {
    !expense.amount.is_sign_negative()
}

/// Whether a budget's spend is within its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetHealth {
    /// Spend is at or below the limit
    OnTrack,
    /// Spend is strictly above the limit
    Overspent,
}

/// Derived spend for one budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetStatus {
    /// Id of the budget this status was computed for
    pub budget_id: i64,
    /// Category label as the user entered it
    pub category: String,
    /// Budget ceiling
    pub limit: Decimal,
    /// Sum of all matching expense amounts
    pub spent: Decimal,
    /// `spent / limit * 100`, uncapped; zero when the limit is not positive
    pub progress_percent: Decimal,
    /// On track or overspent
    pub health: BudgetHealth,
}

impl BudgetStatus {
    /// Progress bounded to `0..=100` for gauge-style displays.
    #[must_use]
    pub fn gauge_percent(&self) -> Decimal {
        self.progress_percent
            .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
    }

    /// Unspent headroom, never negative.
    #[must_use]
    pub fn remaining(&self) -> Decimal {
        (self.limit - self.spent).max(Decimal::ZERO)
    }

    /// False when the budget has no usable limit, so its progress means "no data".
    #[must_use]
    pub fn has_limit(&self) -> bool {
        self.limit > Decimal::ZERO
    }

    /// True when spend has gone past the limit.
    #[must_use]
    pub fn is_overspent(&self) -> bool {
        self.health == BudgetHealth::Overspent
    }

    /// Notification text for an overspent budget.
    #[must_use]
    pub fn alert_message(&self) -> Option<String> {
        self.is_overspent()
            .then(|| format!("Budget \"{}\" exceeded!", self.category))
    }
}

/// Sums the amounts of every expense whose normalized category equals `key`.
fn spent_for_category(expenses: &[Expense], key: &str) -> Decimal {
    if key.is_empty() {
        return Decimal::ZERO;
    }
    expenses
        .iter()
        .filter(|e| is_countable(e) && normalize_category(&e.category) == key)
        .map(|e| e.amount)
        .sum()
}

/// Computes spend, progress and health for each budget, in input order.
///
/// Budgets that share a normalized category each receive the full matching
/// spend. A budget with a non-positive limit reports zero progress and is
/// always on track.
#[must_use]
pub fn compute_budget_status(expenses: &[Expense], budgets: &[Budget]) -> Vec<BudgetStatus> {
    budgets
        .iter()
        .map(|budget| {
            let spent = spent_for_category(expenses, &normalize_category(&budget.category));
            let has_limit = budget.limit > Decimal::ZERO;
            let health = if has_limit && spent > budget.limit {
                BudgetHealth::Overspent
            } else {
                BudgetHealth::OnTrack
            };
            BudgetStatus {
                budget_id: budget.id,
                category: budget.category.clone(),
                limit: budget.limit,
                spent,
                progress_percent: percent_of(spent, budget.limit),
                health,
            }
        })
        .collect()
}

/// Sum of every countable expense, matched to a budget or not.
#[must_use]
pub fn total_spent(expenses: &[Expense]) -> Decimal {
    expenses
        .iter()
        .filter(|e| is_countable(e))
        .map(|e| e.amount)
        .sum()
}

/// Headline figures across all budgets and expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Every countable expense, matched to a budget or not
    pub total_spent: Decimal,
    /// Sum of all budget limits
    pub total_limit: Decimal,
    /// Sum of each budget's non-negative headroom
    pub total_saved: Decimal,
    /// `total_saved` as a percentage of the savings goal
    pub savings_progress_percent: Decimal,
    /// `total_spent` as a percentage of `total_limit`
    pub overall_progress_percent: Decimal,
}

/// Computes totals, savings and overall progress.
#[must_use]
pub fn compute_totals(expenses: &[Expense], budgets: &[Budget], savings_goal: Decimal) -> Totals {
    let statuses = compute_budget_status(expenses, budgets);
    totals_from_statuses(expenses, &statuses, savings_goal)
}

/// Same as [`compute_totals`] when the statuses have already been computed.
#[must_use]
pub fn totals_from_statuses(
    expenses: &[Expense],
    statuses: &[BudgetStatus],
    savings_goal: Decimal,
) -> Totals {
    let total_spent = total_spent(expenses);
    let total_limit: Decimal = statuses.iter().map(|s| s.limit).sum();
    let total_saved: Decimal = statuses.iter().map(BudgetStatus::remaining).sum();

    Totals {
        total_spent,
        total_limit,
        total_saved,
        savings_progress_percent: percent_of(total_saved, savings_goal),
        overall_progress_percent: percent_of(total_spent, total_limit),
    }
}

/// A calendar month. Orders chronologically and renders as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    /// Calendar year
    pub year: i32,
    /// 1-based month
    pub month: u32,
}

impl MonthKey {
    /// The month `date` falls in.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First day of the month, `None` if the key is out of range.
    #[must_use]
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidMonth {
            value: s.to_string(),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let key = Self {
            year: year.parse().map_err(|_| invalid())?,
            month: month.parse().map_err(|_| invalid())?,
        };
        key.first_day().map(|_| key).ok_or_else(invalid)
    }
}

/// Buckets expense amounts by calendar month of their date.
///
/// Expenses with unreadable dates are skipped.
#[must_use]
pub fn group_by_month(expenses: &[Expense]) -> BTreeMap<MonthKey, Decimal> {
    let mut totals = BTreeMap::new();
    for expense in expenses.iter().filter(|e| is_countable(e)) {
        if let Some(date) = expense.calendar_date() {
            *totals
                .entry(MonthKey::from_date(date))
                .or_insert(Decimal::ZERO) += expense.amount;
        }
    }
    totals
}

/// Monthly totals in chronological order.
#[must_use]
pub fn monthly_series(monthly: &BTreeMap<MonthKey, Decimal>) -> Vec<Decimal> {
    monthly.values().copied().collect()
}

/// Total per normalized category, keeping the first label seen for display.
#[must_use]
pub fn spending_by_category(expenses: &[Expense]) -> BTreeMap<String, (String, Decimal)> {
    let mut totals: BTreeMap<String, (String, Decimal)> = BTreeMap::new();
    for expense in expenses.iter().filter(|e| is_countable(e)) {
        let key = normalize_category(&expense.category);
        if key.is_empty() {
            continue;
        }
        totals
            .entry(key)
            .or_insert_with(|| (expense.category.trim().to_string(), Decimal::ZERO))
            .1 += expense.amount;
    }
    totals
}
