//! The combined dashboard view.
//!
//! Every presentation surface (dashboard, budgets page, reports page) reads
//! from one [`DashboardView`] so category matching and totals are computed
//! once, by [`crate::core::aggregation`].

use crate::{
    config::preferences::Preferences,
    core::{
        aggregation::{self, BudgetStatus, MonthKey, Totals},
        cache::{DashboardCache, ViewKey},
        forecast::{self, CategoryForecast, Forecast, ForecastSettings},
        report::{self, SpendingReport, format_amount, format_budget_status},
    },
    errors::Result,
    models::{Budget, Expense},
    store::Store,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Everything derived from one owner's expenses and budgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    /// Currency code the amounts should be shown in
    pub currency: String,
    /// One entry per budget, in budget order
    pub statuses: Vec<BudgetStatus>,
    /// Headline spend, limit and savings figures
    pub totals: Totals,
    /// Spend per calendar month, oldest first
    pub monthly_totals: BTreeMap<MonthKey, Decimal>,
    /// Overall next-month forecast
    pub forecast: Forecast,
    /// Recent monthly totals for the trend chart
    pub trend: Vec<Decimal>,
    /// Forecast per category, ordered by normalized name
    pub category_forecasts: Vec<CategoryForecast>,
    /// Data for the reports view
    pub report: SpendingReport,
    /// Advice naming the biggest category
    pub insight: String,
    /// One message per overspent budget
    pub alerts: Vec<String>,
}

impl DashboardView {
    /// Statuses of budgets whose spend exceeds their limit.
    pub fn overspent(&self) -> impl Iterator<Item = &BudgetStatus> {
        self.statuses.iter().filter(|s| s.is_overspent())
    }
}

/// Computes the dashboard from already-fetched records.
#[must_use]
pub fn build_dashboard(
    expenses: &[Expense],
    budgets: &[Budget],
    preferences: &Preferences,
    settings: &ForecastSettings,
) -> DashboardView {
    let statuses = aggregation::compute_budget_status(expenses, budgets);
    let totals = aggregation::totals_from_statuses(expenses, &statuses, preferences.savings_goal);
    let monthly_totals = aggregation::group_by_month(expenses);
    let series = aggregation::monthly_series(&monthly_totals);
    let report = report::generate_spending_report(expenses, budgets);
    let alerts = statuses.iter().filter_map(BudgetStatus::alert_message).collect();

    DashboardView {
        currency: preferences.currency.clone(),
        forecast: forecast::forecast_with(&series, settings),
        trend: forecast::build_trend_series(&series, settings.trend_window),
        category_forecasts: forecast::forecast_by_category(expenses, settings),
        insight: report::spending_insight(&report, &preferences.currency),
        statuses,
        totals,
        monthly_totals,
        report,
        alerts,
    }
}

/// Fetches the owner's records and computes the dashboard.
#[instrument(skip(store, preferences, settings))]
pub async fn load_dashboard(
    store: &Store,
    owner_id: &str,
    preferences: &Preferences,
    settings: &ForecastSettings,
) -> Result<DashboardView> {
    let expenses = store.expenses_for_owner(owner_id).await?;
    let budgets = store.budgets_for_owner(owner_id).await?;
    debug!(
        expenses = expenses.len(),
        budgets = budgets.len(),
        "Building dashboard"
    );
    Ok(build_dashboard(&expenses, &budgets, preferences, settings))
}

/// Like [`load_dashboard`], reusing the cached view while neither collection
/// has changed.
pub async fn load_dashboard_cached(
    store: &Store,
    cache: &DashboardCache,
    owner_id: &str,
    preferences: &Preferences,
    settings: &ForecastSettings,
) -> Result<Arc<DashboardView>> {
    // Versions are read before fetching so a concurrent write can only make
    // the entry stale, never hide a change.
    let key = ViewKey::current(store.events(), preferences, settings);
    if let Some(view) = cache.get(owner_id, &key).await {
        return Ok(view);
    }

    let view = Arc::new(load_dashboard(store, owner_id, preferences, settings).await?);
    cache.insert(owner_id, key, Arc::clone(&view)).await;
    Ok(view)
}

fn describe_forecast(forecast: &Forecast, currency: &str) -> String {
    match forecast {
        Forecast::Projected(p) => format!(
            "{} next month ({:+.1}%, {}% confidence) - {}",
            format_amount(p.predicted.round_dp(2), currency),
            p.percentage_change,
            p.confidence,
            p.suggestion.label()
        ),
        Forecast::InsufficientData {
            months_of_history, ..
        } => format!("Not enough data yet ({months_of_history} of 2 months recorded)"),
        Forecast::OutOfRange { .. } => "Spending changed too sharply to project".to_string(),
    }
}

/// Formats a dashboard as plain text for terminal output.
#[must_use]
pub fn format_dashboard_summary(view: &DashboardView) -> String {
    use std::fmt::Write;

    let currency = view.currency.as_str();
    let totals = &view.totals;
    let mut summary = format!(
        "Spent {} of {} budgeted ({:.1}%)\n",
        format_amount(totals.total_spent, currency),
        format_amount(totals.total_limit, currency),
        totals.overall_progress_percent
    );

    // Writing to a String cannot fail
    let _ = writeln!(
        summary,
        "Saved {} ({:.1}% of goal)",
        format_amount(totals.total_saved, currency),
        totals.savings_progress_percent
    );
    let _ = writeln!(summary, "Forecast: {}", describe_forecast(&view.forecast, currency));

    if !view.statuses.is_empty() {
        summary.push('\n');
        for status in &view.statuses {
            let _ = writeln!(summary, "  {}", format_budget_status(status, currency));
        }
    }

    for alert in &view.alerts {
        let _ = writeln!(summary, "! {alert}");
    }

    let _ = write!(summary, "\n{}", view.insight);
    summary
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::forecast::Suggestion;
    use crate::models::NewBudget;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;

    fn sample() -> (Vec<Expense>, Vec<Budget>) {
        let expenses = vec![
            expense(1, dec!(1000), "Food", "2025-01-10"),
            expense(2, dec!(1200), "food ", "2025-02-10"),
            expense(3, dec!(300), "Travel", "2025-02-11"),
            expense(4, dec!(50), "Food", "not a date"),
        ];
        let budgets = vec![budget(1, "FOOD", dec!(2000)), budget(2, "Travel", dec!(500))];
        (expenses, budgets)
    }

    #[test]
    fn test_build_dashboard() {
        let (expenses, budgets) = sample();
        let prefs = Preferences {
            savings_goal: dec!(1000),
            currency: "USD".to_string(),
        };
        let view = build_dashboard(&expenses, &budgets, &prefs, &ForecastSettings::default());

        assert_eq!(view.statuses[0].spent, dec!(2250));
        assert!(view.statuses[0].is_overspent());
        assert_eq!(view.alerts, vec!["Budget \"FOOD\" exceeded!".to_string()]);
        assert_eq!(view.overspent().count(), 1);

        assert_eq!(view.totals.total_spent, dec!(2550));
        assert_eq!(view.totals.total_saved, dec!(200));
        assert_eq!(view.totals.savings_progress_percent, dec!(20));

        // The undated expense is in the sums but not in the months
        assert_eq!(view.monthly_totals.len(), 2);
        assert_eq!(view.trend, vec![dec!(1000), dec!(1500)]);
        assert!(view.forecast.is_projected());
        assert_eq!(view.category_forecasts.len(), 2);
        assert_eq!(view.report.top_category.as_ref().unwrap().category, "Food");
        assert_eq!(view.currency, "USD");
    }

    #[test]
    fn test_build_dashboard_empty() {
        let view = build_dashboard(
            &[],
            &[],
            &Preferences::default(),
            &ForecastSettings::default(),
        );
        assert!(view.statuses.is_empty());
        assert!(view.alerts.is_empty());
        assert_eq!(
            view.forecast,
            Forecast::InsufficientData {
                months_of_history: 0,
                latest: None,
            }
        );
        assert_eq!(view.totals.overall_progress_percent, Decimal::ZERO);
    }

    #[test]
    fn test_format_dashboard_summary() {
        let (expenses, budgets) = sample();
        let view = build_dashboard(
            &expenses,
            &budgets,
            &Preferences::default(),
            &ForecastSettings::default(),
        );
        let text = format_dashboard_summary(&view);

        assert!(text.starts_with("Spent ₹2550.00 of ₹2500.00 budgeted (102.0%)\n"));
        assert!(text.contains("Forecast: "));
        assert!(text.contains(Suggestion::MaintainBudget.label()));
        assert!(text.contains("  Travel: ₹300.00 / ₹500.00"));
        assert!(text.contains("! Budget \"FOOD\" exceeded!"));
        assert!(text.ends_with("to stay within budget."));
    }

    #[test]
    fn test_format_summary_without_history() {
        let view = build_dashboard(
            &[expense(1, dec!(10), "Food", "2025-01-01")],
            &[],
            &Preferences::default(),
            &ForecastSettings::default(),
        );
        let text = format_dashboard_summary(&view);
        assert!(text.contains("Not enough data yet (1 of 2 months recorded)"));
    }

    #[tokio::test]
    async fn test_load_dashboard_cached() -> Result<()> {
        let store = setup_test_store().await?;
        let cache = DashboardCache::new();
        let prefs = Preferences::default();
        let settings = ForecastSettings::default();

        store
            .create_budget("owner-a", NewBudget::new("Food", dec!(100)))
            .await?;
        let first = load_dashboard_cached(&store, &cache, "owner-a", &prefs, &settings).await?;
        let again = load_dashboard_cached(&store, &cache, "owner-a", &prefs, &settings).await?;
        assert!(Arc::ptr_eq(&first, &again));

        store
            .create_expense("owner-a", new_expense(dec!(150), "food", "2025-03-01"))
            .await?;
        let fresh = load_dashboard_cached(&store, &cache, "owner-a", &prefs, &settings).await?;
        assert!(!Arc::ptr_eq(&first, &fresh));
        assert_eq!(fresh.statuses[0].spent, dec!(150));
        assert_eq!(fresh.alerts.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_load_dashboard_with_extreme_month_to_month_jump() -> Result<()> {
        let store = setup_test_store().await?;
        store
            .create_expense("owner-a", new_expense(dec!(0.01), "Food", "2025-01-10"))
            .await?;
        store
            .create_expense(
                "owner-a",
                new_expense(dec!(1000000000000000), "Food", "2025-02-10"),
            )
            .await?;

        let view = load_dashboard(
            &store,
            "owner-a",
            &Preferences::default(),
            &ForecastSettings::default(),
        )
        .await?;
        assert_eq!(view.forecast, Forecast::OutOfRange { months_of_history: 2 });
        assert_eq!(
            view.category_forecasts[0].forecast,
            Forecast::OutOfRange { months_of_history: 2 }
        );
        assert!(format_dashboard_summary(&view).contains("too sharply to project"));
        Ok(())
    }

    #[tokio::test]
    async fn test_load_dashboard_is_owner_scoped() -> Result<()> {
        let store = setup_test_store().await?;
        store
            .create_expense("owner-b", new_expense(dec!(99), "Food", "2025-03-01"))
            .await?;

        let view = load_dashboard(
            &store,
            "owner-a",
            &Preferences::default(),
            &ForecastSettings::default(),
        )
        .await?;
        assert_eq!(view.totals.total_spent, Decimal::ZERO);
        Ok(())
    }
}
