//! Push-style snapshots of one owner's records.
//!
//! A [`Subscription`] first yields the owner's current records, then a fresh
//! snapshot every time the collection changes for that owner. Store failures
//! are yielded as errors and the subscription keeps going; it ends once the
//! event bus is gone. Dropping it unsubscribes.

use crate::{
    core::{
        budget::budgets_for_owner,
        events::{ChangeEvent, EventBus},
        expense::expenses_for_owner,
    },
    errors::Result,
    models::{Budget, Collection, Expense},
};
use sea_orm::DatabaseConnection;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, warn};

/// A record type that lives in one collection and is scoped by owner.
pub trait OwnedRecord: Sized + Send {
    /// Collection the records are stored in
    const COLLECTION: Collection;

    /// Point-in-time query of every record owned by `owner_id`.
    fn query_by_owner(
        db: &DatabaseConnection,
        owner_id: &str,
    ) -> impl Future<Output = Result<Vec<Self>>> + Send;
}

impl OwnedRecord for Expense {
    const COLLECTION: Collection = Collection::Expenses;

    fn query_by_owner(
        db: &DatabaseConnection,
        owner_id: &str,
    ) -> impl Future<Output = Result<Vec<Self>>> + Send {
        expenses_for_owner(db, owner_id)
    }
}

impl OwnedRecord for Budget {
    const COLLECTION: Collection = Collection::Budgets;

    fn query_by_owner(
        db: &DatabaseConnection,
        owner_id: &str,
    ) -> impl Future<Output = Result<Vec<Self>>> + Send {
        budgets_for_owner(db, owner_id)
    }
}

/// Live view of one owner's records in one collection.
#[derive(Debug)]
pub struct Subscription<R> {
    db: Arc<DatabaseConnection>,
    owner_id: String,
    receiver: broadcast::Receiver<ChangeEvent>,
    // Set when a snapshot is owed; cleared only once one has been produced,
    // so a cancelled `next_snapshot` loses nothing.
    pending: bool,
    _record: PhantomData<fn() -> R>,
}

impl<R: OwnedRecord> Subscription<R> {
    /// Starts listening. The first call to [`Self::next_snapshot`] returns the
    /// current records.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, events: &EventBus, owner_id: &str) -> Self {
        Self {
            db,
            owner_id: owner_id.to_string(),
            receiver: events.subscribe(),
            pending: true,
            _record: PhantomData,
        }
    }

    /// Owner whose records this subscription follows.
    #[must_use]
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Waits for the next snapshot.
    ///
    /// Returns `None` once the event bus has been dropped and no snapshot is
    /// owed. Several changes that arrive together produce a single snapshot.
    /// This method is cancel safe.
    pub async fn next_snapshot(&mut self) -> Option<Result<Vec<R>>> {
        loop {
            if self.pending {
                let snapshot = R::query_by_owner(&self.db, &self.owner_id).await;
                self.pending = false;
                if let Ok(records) = &snapshot {
                    debug!(
                        collection = %R::COLLECTION,
                        owner_id = %self.owner_id,
                        count = records.len(),
                        "Delivering snapshot"
                    );
                }
                return Some(snapshot);
            }

            match self.receiver.recv().await {
                Ok(event) => {
                    if event.concerns(R::COLLECTION, &self.owner_id) {
                        self.pending = true;
                        self.drain_queued();
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        collection = %R::COLLECTION,
                        skipped,
                        "Subscription lagged; resynchronising"
                    );
                    self.pending = true;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Swallows events already queued so they collapse into one snapshot.
    fn drain_queued(&mut self) {
        loop {
            match self.receiver.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => {}
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::events::ChangeKind;
    use crate::models::NewBudget;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    #[tokio::test]
    async fn test_initial_snapshot_then_updates() -> Result<()> {
        let store = setup_test_store().await?;
        store
            .create_expense("owner-a", new_expense(dec!(10), "Food", "2025-01-01"))
            .await?;

        let mut subscription = store.subscribe_expenses("owner-a");
        let initial = subscription.next_snapshot().await.unwrap()?;
        assert_eq!(initial.len(), 1);

        store
            .create_expense("owner-a", new_expense(dec!(5), "Rent", "2025-01-02"))
            .await?;
        let updated = subscription.next_snapshot().await.unwrap()?;
        assert_eq!(updated.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_other_owners_and_collections_are_ignored() -> Result<()> {
        let store = setup_test_store().await?;
        let mut subscription = store.subscribe_expenses("owner-a");
        assert!(subscription.next_snapshot().await.unwrap()?.is_empty());

        store
            .create_expense("owner-b", new_expense(dec!(10), "Food", "2025-01-01"))
            .await?;
        store
            .create_budget("owner-a", NewBudget::new("Food", dec!(100)))
            .await?;

        let waited =
            tokio::time::timeout(Duration::from_millis(50), subscription.next_snapshot()).await;
        assert!(waited.is_err(), "no snapshot expected for unrelated changes");

        Ok(())
    }

    #[tokio::test]
    async fn test_burst_of_changes_collapses() -> Result<()> {
        let store = setup_test_store().await?;
        let mut subscription = store.subscribe_budgets("owner-a");
        subscription.next_snapshot().await.unwrap()?;

        for category in ["Food", "Rent", "Fun"] {
            store
                .create_budget("owner-a", NewBudget::new(category, dec!(10)))
                .await?;
        }

        let snapshot = subscription.next_snapshot().await.unwrap()?;
        assert_eq!(snapshot.len(), 3);
        let waited =
            tokio::time::timeout(Duration::from_millis(50), subscription.next_snapshot()).await;
        assert!(waited.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_lagged_subscription_resynchronises() -> Result<()> {
        let db = Arc::new(setup_test_db().await?);
        let events = EventBus::new(1);
        let mut subscription: Subscription<Expense> = Subscription::new(db, &events, "owner-a");
        subscription.next_snapshot().await.unwrap()?;

        events.publish(Collection::Expenses, "someone", 1, ChangeKind::Created);
        events.publish(Collection::Expenses, "someone", 2, ChangeKind::Created);
        events.publish(Collection::Expenses, "someone", 3, ChangeKind::Created);

        // Lagging forces a fresh snapshot even though no event concerned us
        let snapshot = subscription.next_snapshot().await.unwrap()?;
        assert!(snapshot.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_subscription_ends_with_the_bus() -> Result<()> {
        let db = Arc::new(setup_test_db().await?);
        let events = EventBus::default();
        let mut subscription: Subscription<Budget> = Subscription::new(db, &events, "owner-a");
        assert_eq!(subscription.owner_id(), "owner-a");
        subscription.next_snapshot().await.unwrap()?;

        drop(events);
        assert!(subscription.next_snapshot().await.is_none());

        Ok(())
    }
}
