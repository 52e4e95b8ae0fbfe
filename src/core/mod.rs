/// Budget/expense aggregation: spend per budget, totals, monthly buckets
pub mod aggregation;
/// Budget creation, listing and deletion
pub mod budget;
/// Per-owner cache of computed dashboard views
pub mod cache;
/// Keyword categorizer for expenses recorded without a category
pub mod categorize;
/// The combined dashboard view and its text summary
pub mod dashboard;
/// In-process change notifications
pub mod events;
/// Expense recording, listing and deletion
pub mod expense;
/// Next-month forecasts and trend series
pub mod forecast;
/// Expense history read from CSV exports
pub mod import;
/// Dashboard that follows the store as it changes
pub mod live;
/// Conversion between decimal amounts and stored minor units
pub mod money;
/// Spending report and text formatting helpers
pub mod report;
/// Push-style snapshots of one owner's records
pub mod subscription;
