//! Budget business logic - Creating, listing and deleting budgets.
//!
//! Budgets only store their ceiling. How much has been spent against a budget
//! is never written here; it is derived from expenses by
//! [`crate::core::aggregation`]. Deleting a budget leaves its expenses alone.

use crate::{
    core::money::to_minor_units,
    entities::{Budget as BudgetEntity, budget},
    errors::{Error, Result},
    models::{Budget, Collection, NewBudget},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, instrument};

/// Creates a budget for `owner_id`.
///
/// The category must not be blank and the limit must be positive with at
/// most two decimal places.
#[instrument(skip(db, new_budget))]
pub async fn create_budget(
    db: &DatabaseConnection,
    owner_id: &str,
    new_budget: NewBudget,
) -> Result<Budget> {
    if owner_id.trim().is_empty() {
        return Err(Error::MissingField { field: "owner_id" });
    }

    let category = new_budget.category.trim();
    if category.is_empty() {
        return Err(Error::MissingField { field: "category" });
    }

    let limit = new_budget.limit;
    if limit <= Decimal::ZERO {
        return Err(Error::InvalidLimit { limit });
    }
    let limit_minor = to_minor_units(limit).ok_or(Error::InvalidLimit { limit })?;

    let model = budget::ActiveModel {
        owner_id: Set(owner_id.to_string()),
        category: Set(category.to_string()),
        limit_minor: Set(limit_minor),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    debug!(id = model.id, category = %model.category, "Created budget");
    Ok(model.into())
}

/// Retrieves every budget owned by `owner_id` in creation order.
pub async fn budgets_for_owner(db: &DatabaseConnection, owner_id: &str) -> Result<Vec<Budget>> {
    let models = BudgetEntity::find()
        .filter(budget::Column::OwnerId.eq(owner_id))
        .order_by_asc(budget::Column::Id)
        .all(db)
        .await?;
    Ok(models.into_iter().map(Budget::from).collect())
}

/// Deletes one of the owner's budgets. Expenses in its category are untouched.
#[instrument(skip(db))]
pub async fn delete_budget(db: &DatabaseConnection, owner_id: &str, budget_id: i64) -> Result<()> {
    let result = BudgetEntity::delete_many()
        .filter(budget::Column::Id.eq(budget_id))
        .filter(budget::Column::OwnerId.eq(owner_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::RecordNotFound {
            collection: Collection::Budgets,
            id: budget_id,
        });
    }
    debug!(id = budget_id, "Deleted budget");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::expense::expenses_for_owner;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_budget_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_budget(&db, "owner", NewBudget::new("", dec!(100))).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::MissingField { field: "category" }
        ));

        let result = create_budget(&db, "owner", NewBudget::new("Food", Decimal::ZERO)).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidLimit { .. }));

        let result = create_budget(&db, "owner", NewBudget::new("Food", dec!(-20))).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidLimit { .. }));

        let result = create_budget(&db, "owner", NewBudget::new("Food", dec!(9.999))).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidLimit { .. }));

        let result = create_budget(&db, "owner", NewBudget::new("Food", Decimal::MAX)).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidLimit { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_budget_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let budget = create_budget(&db, "owner-a", NewBudget::new("  Food ", dec!(2500.75))).await?;
        assert_eq!(budget.category, "Food");
        assert_eq!(budget.limit, dec!(2500.75));

        let stored = budgets_for_owner(&db, "owner-a").await?;
        assert_eq!(stored, vec![budget]);
        assert!(budgets_for_owner(&db, "owner-b").await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_budget_keeps_expenses() -> Result<()> {
        let db = setup_test_db().await?;
        let budget = create_test_budget(&db, "owner-a", "Food", dec!(100)).await?;
        create_test_expense(&db, "owner-a", dec!(40), "Food").await?;

        let result = delete_budget(&db, "owner-b", budget.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::RecordNotFound {
                collection: Collection::Budgets,
                ..
            }
        ));

        delete_budget(&db, "owner-a", budget.id).await?;
        assert!(budgets_for_owner(&db, "owner-a").await?.is_empty());
        assert_eq!(expenses_for_owner(&db, "owner-a").await?.len(), 1);

        Ok(())
    }
}
