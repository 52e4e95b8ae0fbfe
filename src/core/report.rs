//! Spending report generation and text formatting.
//!
//! This module provides the report behind the "reports" view: spending by
//! category, daily totals and the top-spending insight, plus helpers that
//! render amounts, budgets and progress bars as plain text. All functions are
//! framework-agnostic and return structured data or strings.

use crate::core::aggregation::{self, BudgetStatus, is_countable};
use crate::models::{Budget, Expense};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shown instead of an insight when nothing has been recorded.
pub const EMPTY_INSIGHT: &str = "No expenses yet. Start tracking to get insights!";

/// Spend for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// Display label (first spelling seen)
    pub category: String,
    /// Sum of amounts in this category
    pub total: Decimal,
}

/// Aggregated data for the reports view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendingReport {
    /// Every category with spend, largest first
    pub by_category: Vec<CategoryTotal>,
    /// Spend per calendar day, for expenses with readable dates
    pub daily_totals: BTreeMap<NaiveDate, Decimal>,
    /// Category with the highest spend
    pub top_category: Option<CategoryTotal>,
    /// Sum of all expenses
    pub total_spent: Decimal,
    /// Sum of all budget limits
    pub total_limit: Decimal,
}

/// Builds the spending report for a set of expenses and budgets.
#[must_use]
pub fn generate_spending_report(expenses: &[Expense], budgets: &[Budget]) -> SpendingReport {
    let mut by_category: Vec<CategoryTotal> = aggregation::spending_by_category(expenses)
        .into_values()
        .map(|(category, total)| CategoryTotal { category, total })
        .collect();
    by_category.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));

    let mut daily_totals = BTreeMap::new();
    for expense in expenses.iter().filter(|e| is_countable(e)) {
        if let Some(date) = expense.calendar_date() {
            *daily_totals.entry(date).or_insert(Decimal::ZERO) += expense.amount;
        }
    }

    SpendingReport {
        top_category: by_category.first().cloned(),
        by_category,
        daily_totals,
        total_spent: aggregation::total_spent(expenses),
        total_limit: budgets.iter().map(|b| b.limit).sum(),
    }
}

/// One-sentence advice naming the biggest category.
#[must_use]
pub fn spending_insight(report: &SpendingReport, currency: &str) -> String {
    report.top_category.as_ref().map_or_else(
        || EMPTY_INSIGHT.to_string(),
        |top| {
            format!(
                "Consider reducing spending on {} ({}) to stay within budget.",
                top.category,
                format_amount(top.total, currency)
            )
        },
    )
}

/// Symbol for a currency code, or the code itself followed by a space.
#[must_use]
pub fn currency_symbol(code: &str) -> String {
    match code.trim().to_uppercase().as_str() {
        "INR" => "₹".to_string(),
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "JPY" => "¥".to_string(),
        other => format!("{other} "),
    }
}

/// Formats an amount with two decimals and the currency's symbol.
///
/// # Returns
/// Formatted string like "₹50.00" or "-$25.50"
#[must_use]
pub fn format_amount(amount: Decimal, currency: &str) -> String {
    let symbol = currency_symbol(currency);
    if amount.is_sign_negative() && !amount.is_zero() {
        format!("-{symbol}{:.2}", amount.abs())
    } else {
        format!("{symbol}{:.2}", amount.abs())
    }
}

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80.0%`. The bar is
/// clamped to 0-100 while the printed percentage is not.
#[must_use]
pub fn format_progress_bar(progress_percent: Decimal, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped = progress_percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
    let filled = (clamped / Decimal::ONE_HUNDRED * Decimal::from(length))
        .round()
        .to_usize()
        .unwrap_or(0)
        .min(length);
    let empty = length - filled;

    let filled_str = "█".repeat(filled);
    let empty_str = "░".repeat(empty);

    format!("[{filled_str}{empty_str}] {progress_percent:.1}%")
}

/// Summary line for a budget, e.g. `Food: ₹40.00 / ₹100.00 [████░░░░░░] 40.0%`.
#[must_use]
pub fn format_budget_status(status: &BudgetStatus, currency: &str) -> String {
    let amounts = format!(
        "{}: {} / {}",
        status.category,
        format_amount(status.spent, currency),
        format_amount(status.limit, currency)
    );
    if status.is_overspent() {
        format!("{amounts} Overspent!")
    } else if !status.has_limit() {
        format!("{amounts} (no limit set)")
    } else {
        format!("{amounts} {}", format_progress_bar(status.progress_percent, None))
    }
}

/// Generates a summary line for an expense.
#[must_use]
pub fn format_expense_summary(expense: &Expense, currency: &str) -> String {
    let amount_str = format_amount(expense.amount, currency);
    let when = expense
        .calendar_date()
        .map_or_else(|| "undated".to_string(), |d| d.format("%Y-%m-%d").to_string());

    format!(
        "{amount_str} | {} | {} | {when}",
        expense.category.trim(),
        expense.purpose
    )
}
