//! Cache of computed dashboard views.
//!
//! Nothing derived is ever stored on a record. Instead the whole dashboard
//! view is cached per owner, keyed by the collection versions it was built
//! from and by the inputs that shape it. A write to either collection bumps
//! its version, so the next lookup misses and the view is rebuilt.

use crate::config::preferences::Preferences;
use crate::core::dashboard::DashboardView;
use crate::core::events::EventBus;
use crate::core::forecast::ForecastSettings;
use crate::models::Collection;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::trace;

/// Everything a cached view depends on besides the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewKey {
    /// Expense collection version the view saw
    pub expenses_version: u64,
    /// Budget collection version the view saw
    pub budgets_version: u64,
    /// Preferences the view was built with
    pub preferences: Preferences,
    /// Forecast settings the view was built with
    pub settings: ForecastSettings,
}

impl ViewKey {
    /// Key for the current collection versions.
    #[must_use]
    pub fn current(events: &EventBus, preferences: &Preferences, settings: &ForecastSettings) -> Self {
        Self {
            expenses_version: events.version(Collection::Expenses),
            budgets_version: events.version(Collection::Budgets),
            preferences: preferences.clone(),
            settings: settings.clone(),
        }
    }
}

#[derive(Debug)]
struct CachedView {
    key: ViewKey,
    view: Arc<DashboardView>,
}

/// Shared, cloneable view cache. One entry per owner.
#[derive(Debug, Clone, Default)]
pub struct DashboardCache {
    entries: Arc<RwLock<HashMap<String, CachedView>>>,
}

impl DashboardCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached view for `owner_id` if it was built for exactly `key`.
    pub async fn get(&self, owner_id: &str, key: &ViewKey) -> Option<Arc<DashboardView>> {
        let entries = self.entries.read().await;
        let hit = entries
            .get(owner_id)
            .filter(|cached| &cached.key == key)
            .map(|cached| Arc::clone(&cached.view));
        trace!(owner_id, hit = hit.is_some(), "Dashboard cache lookup");
        hit
    }

    /// Stores `view`, replacing any older entry for the owner.
    pub async fn insert(&self, owner_id: &str, key: ViewKey, view: Arc<DashboardView>) {
        let mut entries = self.entries.write().await;
        entries.insert(owner_id.to_string(), CachedView { key, view });
    }

    /// Drops the owner's entry.
    pub async fn invalidate(&self, owner_id: &str) {
        self.entries.write().await.remove(owner_id);
    }

    /// Number of owners with a cached view.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True when no owner has a cached view.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
