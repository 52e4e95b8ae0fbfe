//! Dashboard that follows the store as it changes.
//!
//! [`LiveDashboard`] listens to one owner's expenses and budgets at the same
//! time. Each snapshot replaces the held copy of its collection and the view
//! is rebuilt from the latest pair. Until both collections have reported, the
//! missing one counts as empty.

use crate::{
    config::preferences::Preferences,
    core::{
        dashboard::{DashboardView, build_dashboard},
        forecast::ForecastSettings,
        subscription::Subscription,
    },
    errors::Result,
    models::{Budget, Expense},
    store::Store,
};
use std::collections::HashSet;
use tracing::{info, warn};

/// A continuously recomputed dashboard for one owner.
#[derive(Debug)]
pub struct LiveDashboard {
    expenses: Subscription<Expense>,
    budgets: Subscription<Budget>,
    latest_expenses: Option<Vec<Expense>>,
    latest_budgets: Option<Vec<Budget>>,
    preferences: Preferences,
    settings: ForecastSettings,
    /// Alerts already raised, so each one is logged once per episode
    raised: HashSet<String>,
}

impl LiveDashboard {
    /// Subscribes to both of the owner's collections. Nothing is built until
    /// the first call to [`Self::next_view`].
    #[must_use]
    pub fn new(
        store: &Store,
        owner_id: &str,
        preferences: Preferences,
        settings: ForecastSettings,
    ) -> Self {
        Self {
            expenses: store.subscribe_expenses(owner_id),
            budgets: store.subscribe_budgets(owner_id),
            latest_expenses: None,
            latest_budgets: None,
            preferences,
            settings,
            raised: HashSet::new(),
        }
    }

    /// Owner being followed.
    #[must_use]
    pub fn owner_id(&self) -> &str {
        self.expenses.owner_id()
    }

    /// True once both collections have delivered a snapshot.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.latest_expenses.is_some() && self.latest_budgets.is_some()
    }

    /// Replaces the preferences used for the next rebuild.
    pub fn set_preferences(&mut self, preferences: Preferences) {
        self.preferences = preferences;
    }

    /// The view for the snapshots held right now.
    #[must_use]
    pub fn current(&self) -> DashboardView {
        build_dashboard(
            self.latest_expenses.as_deref().unwrap_or_default(),
            self.latest_budgets.as_deref().unwrap_or_default(),
            &self.preferences,
            &self.settings,
        )
    }

    /// Waits for either collection to change and returns the rebuilt view.
    ///
    /// Store errors are passed through and the dashboard keeps its previous
    /// snapshots. Returns `None` when the store's event bus is gone.
    pub async fn next_view(&mut self) -> Option<Result<DashboardView>> {
        tokio::select! {
            snapshot = self.expenses.next_snapshot() => match snapshot? {
                Ok(expenses) => self.latest_expenses = Some(expenses),
                Err(e) => return Some(Err(e)),
            },
            snapshot = self.budgets.next_snapshot() => match snapshot? {
                Ok(budgets) => self.latest_budgets = Some(budgets),
                Err(e) => return Some(Err(e)),
            },
        }

        let view = self.current();
        self.raise_new_alerts(&view);
        Some(Ok(view))
    }

    fn raise_new_alerts(&mut self, view: &DashboardView) {
        let active: HashSet<String> = view.alerts.iter().cloned().collect();
        for alert in active.difference(&self.raised) {
            warn!(owner_id = %self.owner_id(), "{alert}");
        }
        for cleared in self.raised.difference(&active) {
            info!(owner_id = %self.owner_id(), alert = %cleared, "Budget back on track");
        }
        self.raised = active;
    }
}
