//! The record store: persistence plus change notifications.
//!
//! [`Store`] wraps the database connection and the [`EventBus`]. Writes go
//! through the functions in [`crate::core::expense`] and
//! [`crate::core::budget`]; once a write succeeds the matching change event is
//! published, so subscribers always re-query data that already includes it.

use crate::{
    config::database::{create_connection, create_tables},
    core::{
        budget,
        events::{ChangeKind, EventBus},
        expense,
        subscription::{OwnedRecord, Subscription},
    },
    errors::Result,
    models::{Budget, Collection, Expense, NewBudget, NewExpense},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::instrument;

/// Shared handle to the owner-scoped record store.
#[derive(Debug, Clone)]
pub struct Store {
    db: Arc<DatabaseConnection>,
    events: EventBus,
}

impl Store {
    /// Wraps an open connection whose tables already exist.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db: Arc::new(db),
            events: EventBus::default(),
        }
    }

    /// Connects to `database_url` and makes sure both tables exist.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let db = create_connection(database_url).await?;
        create_tables(&db).await?;
        Ok(Self::new(db))
    }

    /// The underlying connection, for direct queries.
    #[must_use]
    pub fn database(&self) -> &DatabaseConnection {
        &self.db
    }

    /// The change channel shared by every clone of this store.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Records an expense and notifies expense subscribers.
    #[instrument(skip(self, new_expense))]
    pub async fn create_expense(&self, owner_id: &str, new_expense: NewExpense) -> Result<Expense> {
        let created = expense::create_expense(&self.db, owner_id, new_expense).await?;
        self.events
            .publish(Collection::Expenses, owner_id, created.id, ChangeKind::Created);
        Ok(created)
    }

    /// Deletes one of the owner's expenses and notifies subscribers.
    pub async fn delete_expense(&self, owner_id: &str, expense_id: i64) -> Result<()> {
        expense::delete_expense(&self.db, owner_id, expense_id).await?;
        self.events
            .publish(Collection::Expenses, owner_id, expense_id, ChangeKind::Deleted);
        Ok(())
    }

    /// Creates a budget and notifies budget subscribers.
    #[instrument(skip(self, new_budget))]
    pub async fn create_budget(&self, owner_id: &str, new_budget: NewBudget) -> Result<Budget> {
        let created = budget::create_budget(&self.db, owner_id, new_budget).await?;
        self.events
            .publish(Collection::Budgets, owner_id, created.id, ChangeKind::Created);
        Ok(created)
    }

    /// Deletes one of the owner's budgets and notifies subscribers.
    pub async fn delete_budget(&self, owner_id: &str, budget_id: i64) -> Result<()> {
        budget::delete_budget(&self.db, owner_id, budget_id).await?;
        self.events
            .publish(Collection::Budgets, owner_id, budget_id, ChangeKind::Deleted);
        Ok(())
    }

    /// Point-in-time list of the owner's expenses, oldest first.
    pub async fn expenses_for_owner(&self, owner_id: &str) -> Result<Vec<Expense>> {
        expense::expenses_for_owner(&self.db, owner_id).await
    }

    /// Point-in-time list of the owner's budgets, in creation order.
    pub async fn budgets_for_owner(&self, owner_id: &str) -> Result<Vec<Budget>> {
        budget::budgets_for_owner(&self.db, owner_id).await
    }

    /// Live snapshots of one owner's records.
    #[must_use]
    pub fn subscribe<R: OwnedRecord>(&self, owner_id: &str) -> Subscription<R> {
        Subscription::new(Arc::clone(&self.db), &self.events, owner_id)
    }

    /// Live snapshots of the owner's expenses.
    #[must_use]
    pub fn subscribe_expenses(&self, owner_id: &str) -> Subscription<Expense> {
        self.subscribe(owner_id)
    }

    /// Live snapshots of the owner's budgets.
    #[must_use]
    pub fn subscribe_budgets(&self, owner_id: &str) -> Subscription<Budget> {
        self.subscribe(owner_id)
    }
}
