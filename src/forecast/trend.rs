//! Spending, income and savings-capacity trend forecasts.
//!
//! All functions are pure: they take caller-supplied history and never fail.
//! A fit that cannot be made degrades to the constant-mean model, and a
//! forecast with no usable history reports `TrendDirection::InsufficientData`.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Algorithm, Transaction, TransactionType, TrendDirection};
use crate::fit::fit_or_mean;
use crate::math::{mean, volatility};
use crate::models::{RegressionModel, predict};

/// Number of forward months in a spending forecast.
pub const SPENDING_HORIZON: usize = 3;

/// Upper bound on any reported trend confidence.
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Observation count at which history counts as fully sufficient.
pub const SUFFICIENT_OBSERVATIONS: f64 = 12.0;

/// Expense total for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingPrediction {
    pub monthly_totals: Vec<MonthlyTotal>,
    pub model: RegressionModel,
    /// Forward monthly spending, floored at zero.
    pub next_months: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingForecast {
    pub trend: TrendDirection,
    pub prediction: Option<SpendingPrediction>,
    pub confidence: f64,
}

impl SpendingForecast {
    fn insufficient() -> Self {
        Self {
            trend: TrendDirection::InsufficientData,
            prediction: None,
            confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeForecast {
    pub trend: TrendDirection,
    /// `slope / first value`, in percent per period.
    pub growth_rate: f64,
    pub model: RegressionModel,
    pub predictions: Vec<f64>,
    pub confidence: f64,
}

/// Average and linear trend of one history series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesTrend {
    pub average: f64,
    pub current: f64,
    pub slope: f64,
    pub direction: TrendDirection,
    /// R² of the linear fit.
    pub confidence: f64,
    pub volatility: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsProjection {
    pub period: usize,
    pub income: f64,
    pub expenses: f64,
    pub capacity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsCapacityForecast {
    pub income: SeriesTrend,
    pub expenses: SeriesTrend,
    pub projections: Vec<SavingsProjection>,
    pub confidence: f64,
}

/// Forecast monthly spending from expense transactions.
///
/// Expenses dated within the trailing `months` calendar months ending at
/// `as_of` are bucketed per month. Linear and exponential fits are compared
/// on month index and the higher R² wins.
pub fn predict_spending_trend(
    transactions: &[Transaction],
    months: u32,
    as_of: NaiveDate,
) -> SpendingForecast {
    let monthly_totals = monthly_expense_totals(transactions, months, as_of);
    if monthly_totals.len() < 2 {
        debug!(buckets = monthly_totals.len(), "spending trend: insufficient data");
        return SpendingForecast::insufficient();
    }

    let y: Vec<f64> = monthly_totals.iter().map(|m| m.total).collect();
    let x = index_axis(y.len());

    let linear = fit_or_mean(Algorithm::Linear, &x, &y);
    let exponential = fit_or_mean(Algorithm::Exponential, &x, &y);
    let best = if exponential.r_squared() > linear.r_squared() {
        exponential
    } else {
        linear.clone()
    };

    let n = y.len();
    let next_months = (0..SPENDING_HORIZON)
        .map(|i| predict(&best, (n + i) as f64).max(0.0))
        .collect();

    let confidence = best.r_squared().clamp(0.0, MAX_CONFIDENCE);
    let trend = TrendDirection::from_slope(linear.slope(), mean(&y));

    SpendingForecast {
        trend,
        prediction: Some(SpendingPrediction {
            monthly_totals,
            model: best,
            next_months,
        }),
        confidence,
    }
}

/// Forecast income `months` periods ahead with a linear fit.
pub fn predict_income_growth(income_history: &[f64], months: usize) -> IncomeForecast {
    if income_history.is_empty() {
        return IncomeForecast {
            trend: TrendDirection::InsufficientData,
            growth_rate: 0.0,
            model: RegressionModel::Mean { value: 0.0 },
            predictions: Vec::new(),
            confidence: 0.0,
        };
    }

    let x = index_axis(income_history.len());
    let model = fit_or_mean(Algorithm::Linear, &x, income_history);

    let first = income_history[0];
    let growth_rate = if first != 0.0 {
        model.slope() / first * 100.0
    } else {
        0.0
    };

    let n = income_history.len();
    let predictions = (0..months)
        .map(|i| predict(&model, (n + i) as f64).max(0.0))
        .collect();

    IncomeForecast {
        trend: TrendDirection::from_slope(model.slope(), mean(income_history)),
        growth_rate,
        confidence: model.r_squared().clamp(0.0, MAX_CONFIDENCE),
        model,
        predictions,
    }
}

/// Project savings capacity (income − expenses) for `months` periods.
///
/// Each series is extrapolated from its latest value as
/// `current · (1 + slope/current)^period`.
pub fn predict_savings_capacity(
    income_history: &[f64],
    expense_history: &[f64],
    months: usize,
) -> SavingsCapacityForecast {
    let income = series_trend(income_history);
    let expenses = series_trend(expense_history);

    let projections = (1..=months)
        .map(|period| {
            let inc = project(income.current, income.slope, period);
            let exp = project(expenses.current, expenses.slope, period);
            SavingsProjection {
                period,
                income: inc,
                expenses: exp,
                capacity: inc - exp,
            }
        })
        .collect();

    let avg_volatility = (income.volatility + expenses.volatility) / 2.0;
    let observations = income_history.len().min(expense_history.len()) as f64;
    let sufficiency = (observations / SUFFICIENT_OBSERVATIONS).min(1.0);
    let confidence = (((1.0 - avg_volatility).clamp(0.0, 1.0) + sufficiency) / 2.0).clamp(0.0, 1.0);

    SavingsCapacityForecast {
        income,
        expenses,
        projections,
        confidence,
    }
}

/// Average, latest value and linear trend of a series.
pub fn series_trend(values: &[f64]) -> SeriesTrend {
    let Some(&current) = values.last() else {
        return SeriesTrend {
            average: 0.0,
            current: 0.0,
            slope: 0.0,
            direction: TrendDirection::InsufficientData,
            confidence: 0.0,
            volatility: 0.0,
        };
    };

    let average = mean(values);
    let model = fit_or_mean(Algorithm::Linear, &index_axis(values.len()), values);
    let slope = model.slope();

    SeriesTrend {
        average,
        current,
        slope,
        direction: TrendDirection::from_slope(slope, average),
        confidence: model.r_squared(),
        volatility: volatility(values),
    }
}

fn project(current: f64, slope: f64, period: usize) -> f64 {
    if current == 0.0 {
        return slope * period as f64;
    }
    current * (1.0 + slope / current).powi(period as i32)
}

/// Expense totals per calendar month inside the trailing window, oldest first.
pub fn monthly_expense_totals(
    transactions: &[Transaction],
    months: u32,
    as_of: NaiveDate,
) -> Vec<MonthlyTotal> {
    let Some(window_start) = window_start(months, as_of) else {
        return Vec::new();
    };

    let mut buckets: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for tx in transactions {
        if tx.transaction_type != TransactionType::Expense {
            continue;
        }
        let date = tx.transaction_date;
        if date < window_start || date > as_of {
            continue;
        }
        *buckets.entry((date.year(), date.month())).or_insert(0.0) += tx.amount.abs();
    }

    buckets
        .into_iter()
        .map(|((year, month), total)| MonthlyTotal { year, month, total })
        .collect()
}

fn window_start(months: u32, as_of: NaiveDate) -> Option<NaiveDate> {
    if months == 0 {
        return None;
    }
    as_of
        .with_day(1)?
        .checked_sub_months(Months::new(months - 1))
}

fn index_axis(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64).collect()
}
