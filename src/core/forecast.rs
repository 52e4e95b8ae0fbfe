//! Next-period spend projection.
//!
//! The projection is a two-point heuristic: the average of the two most recent
//! monthly totals, scaled by the growth between them. It is not a regression
//! and the confidence figure is a display value, not a statistical interval.

use crate::core::aggregation::{MonthKey, is_countable, normalize_category};
use crate::models::Expense;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Predicted spend above which a bigger budget is suggested.
pub const DEFAULT_INCREASE_THRESHOLD: Decimal = Decimal::from_parts(40_000, 0, 0, false, 0);
/// Number of months shown in a trend series.
pub const DEFAULT_TREND_WINDOW: usize = 5;

const CONFIDENCE_FLOOR: usize = 70;
const CONFIDENCE_STEP: usize = 5;
const CONFIDENCE_CAP: usize = 95;

/// Tunables for forecasting, read from the `[forecast]` config table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    /// Predicted spend above this suggests increasing the budget
    pub increase_threshold: Decimal,
    /// How many recent months a trend series keeps
    pub trend_window: usize,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            increase_threshold: DEFAULT_INCREASE_THRESHOLD,
            trend_window: DEFAULT_TREND_WINDOW,
        }
    }
}

/// Advice attached to a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suggestion {
    /// Predicted spend is above the increase threshold
    IncreaseBudget,
    /// Predicted spend is at or below the threshold
    MaintainBudget,
}

impl Suggestion {
    /// Human-readable advice.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::IncreaseBudget => "Increase Budget",
            Self::MaintainBudget => "Maintain Budget",
        }
    }
}

/// A numeric projection for the next month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    /// Expected spend for the next month
    pub predicted: Decimal,
    /// Change from the latest month to the prediction, in percent
    pub percentage_change: Decimal,
    /// Growth between the two most recent months as a fraction
    pub growth_rate: Decimal,
    /// 70 plus 5 per month of history, capped at 95
    pub confidence: u8,
    /// Whether the prediction crosses the increase threshold
    pub suggestion: Suggestion,
    /// Number of months the projection was computed from
    pub months_of_history: usize,
}

/// Result of forecasting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Forecast {
    /// Fewer than two months of data. `latest` is the single month's total, if any
    InsufficientData {
        /// Months with dated spend
        months_of_history: usize,
        /// Total of the only month, if there is one
        latest: Option<Decimal>,
    },
    /// The extrapolation does not fit in a `Decimal`
    OutOfRange {
        /// Months with dated spend
        months_of_history: usize,
    },
    /// A numeric projection
    Projected(Projection),
}

impl Forecast {
    /// The predicted value, `None` unless a projection was made.
    #[must_use]
    pub const fn predicted(&self) -> Option<Decimal> {
        match self {
            Self::Projected(p) => Some(p.predicted),
            Self::InsufficientData { .. } | Self::OutOfRange { .. } => None,
        }
    }

    /// True for a numeric projection.
    #[must_use]
    pub const fn is_projected(&self) -> bool {
        matches!(self, Self::Projected(_))
    }
}

/// Display confidence for a given amount of history.
#[must_use]
pub fn confidence_for(months_of_history: usize) -> u8 {
    let raw = CONFIDENCE_FLOOR.saturating_add(CONFIDENCE_STEP.saturating_mul(months_of_history));
    u8::try_from(raw.min(CONFIDENCE_CAP)).unwrap_or(u8::MAX)
}

/// Forecasts the next month from chronologically ordered monthly totals,
/// using the default threshold.
#[must_use]
pub fn forecast_next_period(monthly_totals: &[Decimal]) -> Forecast {
    forecast_with(monthly_totals, &ForecastSettings::default())
}

/// Forecasts the next month from chronologically ordered monthly totals.
#[must_use]
pub fn forecast_with(monthly_totals: &[Decimal], settings: &ForecastSettings) -> Forecast {
    let months_of_history = monthly_totals.len();
    let [.., prev, curr] = monthly_totals else {
        return Forecast::InsufficientData {
            months_of_history,
            latest: monthly_totals.last().copied(),
        };
    };
    project(*prev, *curr, months_of_history, settings)
        .map_or(Forecast::OutOfRange { months_of_history }, Forecast::Projected)
}

/// Two-point extrapolation with checked arithmetic; `None` on overflow.
fn project(
    prev: Decimal,
    curr: Decimal,
    months_of_history: usize,
    settings: &ForecastSettings,
) -> Option<Projection> {
    let growth_rate = if prev.is_zero() {
        Decimal::ZERO
    } else {
        curr.checked_sub(prev)?.checked_div(prev)?
    };
    let average = prev.checked_add(curr)?.checked_div(Decimal::TWO)?;
    let predicted = average.checked_mul(Decimal::ONE.checked_add(growth_rate)?)?;
    let percentage_change = if curr.is_zero() {
        Decimal::ZERO
    } else {
        predicted
            .checked_sub(curr)?
            .checked_div(curr)?
            .checked_mul(Decimal::ONE_HUNDRED)?
    };
    let suggestion = if predicted > settings.increase_threshold {
        Suggestion::IncreaseBudget
    } else {
        Suggestion::MaintainBudget
    };

    Some(Projection {
        predicted,
        percentage_change,
        growth_rate,
        confidence: confidence_for(months_of_history),
        suggestion,
        months_of_history,
    })
}

/// The last `window` monthly totals, oldest first. Never padded.
#[must_use]
pub fn build_trend_series(monthly_totals: &[Decimal], window: usize) -> Vec<Decimal> {
    let start = monthly_totals.len().saturating_sub(window);
    monthly_totals[start..].to_vec()
}

/// Forecast and history for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryForecast {
    /// First label seen for the category
    pub category: String,
    /// Total of the most recent month with data
    pub current: Decimal,
    /// Next-month forecast from this category's monthly totals
    pub forecast: Forecast,
    /// Recent monthly totals, oldest first
    pub trend: Vec<Decimal>,
}

/// Forecasts every category that has dated expenses, ordered by normalized name.
#[must_use]
pub fn forecast_by_category(
    expenses: &[Expense],
    settings: &ForecastSettings,
) -> Vec<CategoryForecast> {
    let mut per_category: BTreeMap<String, (String, BTreeMap<MonthKey, Decimal>)> =
        BTreeMap::new();
    for expense in expenses.iter().filter(|e| is_countable(e)) {
        let key = normalize_category(&expense.category);
        let Some(date) = expense.calendar_date() else {
            continue;
        };
        if key.is_empty() {
            continue;
        }
        let (_, months) = per_category
            .entry(key)
            .or_insert_with(|| (expense.category.trim().to_string(), BTreeMap::new()));
        *months
            .entry(MonthKey::from_date(date))
            .or_insert(Decimal::ZERO) += expense.amount;
    }

    per_category
        .into_values()
        .map(|(category, months)| {
            let series: Vec<Decimal> = months.into_values().collect();
            CategoryForecast {
                category,
                current: series.last().copied().unwrap_or_default(),
                forecast: forecast_with(&series, settings),
                trend: build_trend_series(&series, settings.trend_window),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::expense;
    use rust_decimal_macros::dec;

    fn projection(forecast: &Forecast) -> &Projection {
        match forecast {
            Forecast::Projected(p) => p,
            other => panic!("expected a projection, got {other:?}"),
        }
    }

    #[test]
    fn test_forecast_formula() {
        let forecast = forecast_next_period(&[dec!(1000), dec!(1200)]);
        let p = projection(&forecast);
        assert_eq!(p.growth_rate, dec!(0.2));
        assert_eq!(p.predicted, dec!(1320));
        assert_eq!(p.percentage_change, dec!(10));
        assert_eq!(p.confidence, 80);
        assert_eq!(p.suggestion, Suggestion::MaintainBudget);
        assert_eq!(forecast.predicted(), Some(dec!(1320)));
    }

    #[test]
    fn test_forecast_uses_two_most_recent_months() {
        let forecast = forecast_next_period(&[dec!(5), dec!(1000), dec!(1200)]);
        let p = projection(&forecast);
        assert_eq!(p.predicted, dec!(1320));
        assert_eq!(p.months_of_history, 3);
        assert_eq!(p.confidence, 85);
    }

    #[test]
    fn test_forecast_insufficient_data() {
        let forecast = forecast_next_period(&[dec!(750)]);
        assert_eq!(
            forecast,
            Forecast::InsufficientData {
                months_of_history: 1,
                latest: Some(dec!(750)),
            }
        );
        assert_eq!(forecast.predicted(), None);
        assert!(!forecast.is_projected());

        assert_eq!(
            forecast_next_period(&[]),
            Forecast::InsufficientData {
                months_of_history: 0,
                latest: None,
            }
        );
    }

    #[test]
    fn test_forecast_zero_previous_month() {
        let forecast = forecast_next_period(&[Decimal::ZERO, dec!(500)]);
        let p = projection(&forecast);
        assert_eq!(p.growth_rate, Decimal::ZERO);
        assert_eq!(p.predicted, dec!(250));
        assert_eq!(p.percentage_change, dec!(-50));
    }

    #[test]
    fn test_forecast_zero_current_month() {
        let forecast = forecast_next_period(&[dec!(400), Decimal::ZERO]);
        let p = projection(&forecast);
        assert_eq!(p.growth_rate, dec!(-1));
        assert_eq!(p.predicted, Decimal::ZERO);
        assert_eq!(p.percentage_change, Decimal::ZERO);
    }

    #[test]
    fn test_forecast_near_zero_previous_month_is_out_of_range() {
        let forecast = forecast_next_period(&[dec!(0.01), dec!(1000000000000000)]);
        assert_eq!(forecast, Forecast::OutOfRange { months_of_history: 2 });
        assert_eq!(forecast.predicted(), None);
        assert!(!forecast.is_projected());
    }

    #[test]
    fn test_forecast_large_but_representable() {
        let forecast = forecast_next_period(&[dec!(1000000000000000), dec!(2000000000000000)]);
        let p = projection(&forecast);
        assert_eq!(p.growth_rate, Decimal::ONE);
        assert_eq!(p.predicted, dec!(3000000000000000));
        assert_eq!(p.suggestion, Suggestion::IncreaseBudget);
    }

    #[test]
    fn test_confidence_clamp() {
        assert_eq!(confidence_for(0), 70);
        assert_eq!(confidence_for(2), 80);
        assert_eq!(confidence_for(5), 95);
        assert_eq!(confidence_for(10), 95);
        assert_eq!(confidence_for(usize::MAX), 95);

        let ten_months = vec![dec!(100); 10];
        assert_eq!(projection(&forecast_next_period(&ten_months)).confidence, 95);
    }

    #[test]
    fn test_suggestion_threshold_is_strict() {
        let at = forecast_next_period(&[dec!(40000), dec!(40000)]);
        assert_eq!(projection(&at).suggestion, Suggestion::MaintainBudget);

        let above = forecast_next_period(&[dec!(40000), dec!(40002)]);
        assert_eq!(projection(&above).suggestion, Suggestion::IncreaseBudget);
        assert_eq!(Suggestion::IncreaseBudget.label(), "Increase Budget");
    }

    #[test]
    fn test_custom_threshold() {
        let settings = ForecastSettings {
            increase_threshold: dec!(100),
            trend_window: 3,
        };
        let forecast = forecast_with(&[dec!(100), dec!(100)], &settings);
        assert_eq!(projection(&forecast).suggestion, Suggestion::MaintainBudget);
        let forecast = forecast_with(&[dec!(100), dec!(120)], &settings);
        assert_eq!(projection(&forecast).suggestion, Suggestion::IncreaseBudget);
    }

    #[test]
    fn test_trend_series_window() {
        let three = [dec!(1), dec!(2), dec!(3)];
        assert_eq!(build_trend_series(&three, 5), vec![dec!(1), dec!(2), dec!(3)]);

        let seven: Vec<Decimal> = (1..=7).map(Decimal::from).collect();
        assert_eq!(
            build_trend_series(&seven, 5),
            vec![dec!(3), dec!(4), dec!(5), dec!(6), dec!(7)]
        );
        assert!(build_trend_series(&seven, 0).is_empty());
        assert!(build_trend_series(&[], 5).is_empty());
    }

    #[test]
    fn test_forecast_by_category() {
        let expenses = vec![
            expense(1, dec!(1000), "Food", "2025-01-05"),
            expense(2, dec!(700), "food ", "2025-02-05"),
            expense(3, dec!(500), "FOOD", "2025-02-20"),
            expense(4, dec!(80), "Rent", "2025-02-01"),
            expense(5, dec!(999), "Rent", "unknown"),
        ];

        let forecasts = forecast_by_category(&expenses, &ForecastSettings::default());
        assert_eq!(forecasts.len(), 2);

        let food = &forecasts[0];
        assert_eq!(food.category, "Food");
        assert_eq!(food.current, dec!(1200));
        assert_eq!(food.trend, vec![dec!(1000), dec!(1200)]);
        assert_eq!(food.forecast.predicted(), Some(dec!(1320)));

        let rent = &forecasts[1];
        assert_eq!(rent.category, "Rent");
        assert_eq!(rent.current, dec!(80));
        assert!(!rent.forecast.is_projected());
    }
}
