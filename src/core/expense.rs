//! Expense business logic - Handles all expense-related store operations.
//!
//! Provides functions for recording, listing and deleting expenses. Every
//! operation is scoped to an owner id: records belonging to someone else are
//! invisible, including to delete. All functions are async and return Result
//! types for error handling.

use crate::{
    core::{categorize::categorize_description, money::to_minor_units},
    entities::{Expense as ExpenseEntity, expense},
    errors::{Error, Result},
    models::{Collection, Expense, NewExpense, parse_record_date},
};
use chrono::{SecondsFormat, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, instrument};

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Records a new expense for `owner_id`, performing input validation.
///
/// The amount must be non-negative with at most two decimal places. A blank
/// category is derived from the description when one is given. An explicit
/// date must be readable; when absent the current time is used. A frequency
/// is only kept for recurring expenses.
#[instrument(skip(db, new_expense))]
pub async fn create_expense(
    db: &DatabaseConnection,
    owner_id: &str,
    new_expense: NewExpense,
) -> Result<Expense> {
    if owner_id.trim().is_empty() {
        return Err(Error::MissingField { field: "owner_id" });
    }

    let amount = new_expense.amount;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::InvalidAmount { amount });
    }
    let amount_minor = to_minor_units(amount).ok_or(Error::InvalidAmount { amount })?;

    let description = non_empty(new_expense.description);
    let category = match (non_empty(new_expense.category), &description) {
        (Some(category), _) => category,
        (None, Some(desc)) => categorize_description(desc).to_string(),
        (None, None) => return Err(Error::MissingField { field: "category" }),
    };

    let date = match non_empty(new_expense.date) {
        Some(raw) if parse_record_date(&raw).is_some() => raw,
        Some(raw) => return Err(Error::InvalidDate { value: raw }),
        None => Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    let frequency = new_expense
        .frequency
        .filter(|_| new_expense.recurring)
        .map(|f| f.as_str().to_string());

    let model = expense::ActiveModel {
        owner_id: Set(owner_id.to_string()),
        amount_minor: Set(amount_minor),
        category: Set(category),
        purpose: Set(non_empty(new_expense.purpose)),
        description: Set(description),
        date: Set(date),
        recurring: Set(new_expense.recurring),
        frequency: Set(frequency),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    debug!(id = model.id, category = %model.category, "Recorded expense");
    Ok(model.into())
}

/// Retrieves every expense owned by `owner_id`, oldest record first.
pub async fn expenses_for_owner(db: &DatabaseConnection, owner_id: &str) -> Result<Vec<Expense>> {
    let models = ExpenseEntity::find()
        .filter(expense::Column::OwnerId.eq(owner_id))
        .order_by_asc(expense::Column::Id)
        .all(db)
        .await?;
    Ok(models.into_iter().map(Expense::from).collect())
}

/// Finds one of the owner's expenses by id.
pub async fn get_expense(
    db: &DatabaseConnection,
    owner_id: &str,
    expense_id: i64,
) -> Result<Option<Expense>> {
    let model = ExpenseEntity::find_by_id(expense_id)
        .filter(expense::Column::OwnerId.eq(owner_id))
        .one(db)
        .await?;
    Ok(model.map(Expense::from))
}

/// Deletes one of the owner's expenses.
///
/// Missing ids and ids owned by someone else both report `RecordNotFound`.
#[instrument(skip(db))]
pub async fn delete_expense(db: &DatabaseConnection, owner_id: &str, expense_id: i64) -> Result<()> {
    let result = ExpenseEntity::delete_many()
        .filter(expense::Column::Id.eq(expense_id))
        .filter(expense::Column::OwnerId.eq(owner_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::RecordNotFound {
            collection: Collection::Expenses,
            id: expense_id,
        });
    }
    debug!(id = expense_id, "Deleted expense");
    Ok(())
}
