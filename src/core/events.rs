//! In-process change notifications for the record store.
//!
//! Every successful create or delete publishes a [`ChangeEvent`] on a tokio
//! broadcast channel. Listeners receive events in publish order. Each
//! collection also carries a version counter that increases with every change,
//! which callers use as an invalidation key for derived data.

use crate::models::Collection;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::trace;

/// Events buffered per listener before it starts lagging.
pub const DEFAULT_CAPACITY: usize = 256;

/// What happened to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The record was inserted
    Created,
    /// The record was removed
    Deleted,
}

/// A single change to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Collection the record belongs to
    pub collection: Collection,
    /// Owner of the record
    pub owner_id: String,
    /// Id of the changed record
    pub record_id: i64,
    /// Insert or delete
    pub kind: ChangeKind,
    /// Collection version after this change
    pub version: u64,
}

impl ChangeEvent {
    /// True when the event concerns `owner_id`'s records in `collection`.
    #[must_use]
    pub fn concerns(&self, collection: Collection, owner_id: &str) -> bool {
        self.collection == collection && self.owner_id == owner_id
    }
}

#[derive(Debug)]
struct Inner {
    sender: broadcast::Sender<ChangeEvent>,
    expenses_version: AtomicU64,
    budgets_version: AtomicU64,
}

impl Inner {
    const fn counter(&self, collection: Collection) -> &AtomicU64 {
        match collection {
            Collection::Expenses => &self.expenses_version,
            Collection::Budgets => &self.budgets_version,
        }
    }
}

/// Cheaply cloneable handle to the shared change channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    inner: Arc<Inner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    /// A bus whose listeners may fall `capacity` events behind before lagging.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                sender,
                expenses_version: AtomicU64::new(0),
                budgets_version: AtomicU64::new(0),
            }),
        }
    }

    /// Registers a new listener. It sees only events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.inner.sender.subscribe()
    }

    /// Current version of a collection.
    #[must_use]
    pub fn version(&self, collection: Collection) -> u64 {
        self.inner.counter(collection).load(Ordering::Acquire)
    }

    /// Bumps the collection version and notifies every listener.
    pub fn publish(
        &self,
        collection: Collection,
        owner_id: &str,
        record_id: i64,
        kind: ChangeKind,
    ) -> ChangeEvent {
        let version = self.inner.counter(collection).fetch_add(1, Ordering::AcqRel) + 1;
        let event = ChangeEvent {
            collection,
            owner_id: owner_id.to_string(),
            record_id,
            kind,
            version,
        };
        // Sending only fails when nobody is listening
        if self.inner.sender.send(event.clone()).is_err() {
            trace!(?event, "No listeners for change event");
        }
        event
    }

    /// Number of live receivers.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_listeners_in_order() {
        let bus = EventBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        assert_eq!(bus.listener_count(), 2);

        bus.publish(Collection::Expenses, "owner", 1, ChangeKind::Created);
        bus.publish(Collection::Budgets, "owner", 9, ChangeKind::Deleted);

        for receiver in [&mut first, &mut second] {
            let a = receiver.recv().await.unwrap();
            let b = receiver.recv().await.unwrap();
            assert_eq!((a.collection, a.record_id, a.kind), (Collection::Expenses, 1, ChangeKind::Created));
            assert_eq!((b.collection, b.record_id, b.kind), (Collection::Budgets, 9, ChangeKind::Deleted));
        }
    }

    #[test]
    fn test_versions_are_per_collection() {
        let bus = EventBus::default();
        assert_eq!(bus.version(Collection::Expenses), 0);

        let event = bus.publish(Collection::Expenses, "owner", 1, ChangeKind::Created);
        assert_eq!(event.version, 1);
        bus.publish(Collection::Expenses, "owner", 2, ChangeKind::Created);

        assert_eq!(bus.version(Collection::Expenses), 2);
        assert_eq!(bus.version(Collection::Budgets), 0);
    }

    #[test]
    fn test_publish_without_listeners_is_fine() {
        let bus = EventBus::new(0);
        let event = bus.publish(Collection::Budgets, "owner", 3, ChangeKind::Created);
        assert!(event.concerns(Collection::Budgets, "owner"));
        assert!(!event.concerns(Collection::Budgets, "someone-else"));
        assert!(!event.concerns(Collection::Expenses, "owner"));
    }
}
