//! Goal achievement probability, risk assessment and recommendations.
//!
//! Probability scoring is a deterministic additive heuristic:
//!
//! 1. start at 0.5
//! 2. progress bonus: +0.2 above 50%, another +0.2 above 75%
//! 3. capacity ratio (`available / required monthly`):
//!    `>= 1.2` → +0.2, `>= 1.0` → +0.1, `< 0.8` → −0.3, `< 0.6` → −0.5,
//!    checked in that order (so the `< 0.6` band never fires)
//! 4. time remaining: `> 12` months → +0.1, `< 3` months → −0.3
//! 5. investment goals: ±0.1 for bullish / bearish markets
//!
//! and the result is clamped to `[0, 1]`.

use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Goal, GoalType, Level, MarketConditions, MarketTrend, Transaction, TransactionType, UserProfile,
};

/// Average calendar month length used to turn day counts into months.
pub const DAYS_PER_MONTH: f64 = 30.44;

const BASE_PROBABILITY: f64 = 0.5;

/// Income growth (percent per period) below which income advice is given.
pub const LOW_INCOME_GROWTH: f64 = 2.0;

/// Market volatility above which investment goals carry market risk.
pub const HIGH_MARKET_VOLATILITY: f64 = 0.2;

/// Probability and the quantities it was derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalOutlook {
    pub probability: f64,
    /// Display progress in `[0, 1]`.
    pub progress: f64,
    /// `None` when the goal has no deadline.
    pub months_remaining: Option<f64>,
    /// `None` without a deadline or once the deadline has passed.
    pub required_monthly: Option<f64>,
    pub capacity_ratio: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    BudgetOptimization,
    TimelineAdjustment,
    IncomeOptimization,
    SpendingOptimization,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    pub priority: Level,
    pub title: String,
    pub description: String,
    pub action: String,
    pub impact: Level,
    pub effort: Level,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskType {
    Time,
    Capacity,
    Market,
    Progress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Risk {
    #[serde(rename = "type")]
    pub kind: RiskType,
    pub severity: Level,
    pub description: String,
    pub mitigation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Expense totals per category, largest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpendingPatterns {
    pub category_totals: Vec<CategoryTotal>,
}

impl SpendingPatterns {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
        for tx in transactions {
            if tx.transaction_type == TransactionType::Expense {
                *totals.entry(tx.category.as_str()).or_insert(0.0) += tx.amount.abs();
            }
        }

        let mut category_totals: Vec<CategoryTotal> = totals
            .into_iter()
            .map(|(category, total)| CategoryTotal {
                category: category.to_string(),
                total,
            })
            .collect();
        // Stable sort keeps name order for equal totals.
        category_totals.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(std::cmp::Ordering::Equal));

        Self { category_totals }
    }

    pub fn top_categories(&self, n: usize) -> Vec<&str> {
        self.category_totals
            .iter()
            .take(n)
            .map(|c| c.category.as_str())
            .collect()
    }
}

/// Everything the goal engine produces for one goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalReport {
    pub outlook: GoalOutlook,
    pub risks: Vec<Risk>,
    pub recommendations: Vec<Recommendation>,
}

/// Score the goal, assess risks and build recommendations in one call.
pub fn evaluate_goal(
    goal: &Goal,
    profile: &UserProfile,
    market: &MarketConditions,
    patterns: &SpendingPatterns,
    as_of: NaiveDate,
) -> GoalReport {
    GoalReport {
        outlook: calculate_goal_probability(goal, profile, market, as_of),
        risks: assess_risks(goal, profile, market, as_of),
        recommendations: generate_recommendations(goal, profile, patterns, as_of),
    }
}

/// Heuristic probability that `goal` is reached by its deadline.
pub fn calculate_goal_probability(
    goal: &Goal,
    profile: &UserProfile,
    market: &MarketConditions,
    as_of: NaiveDate,
) -> GoalOutlook {
    let raw_progress = goal.raw_progress();
    let progress = raw_progress.clamp(0.0, 1.0);
    let months_remaining = goal.deadline.map(|d| months_between(as_of, d));

    let outlook = |probability: f64, required_monthly: Option<f64>, capacity_ratio: Option<f64>| GoalOutlook {
        probability: probability.clamp(0.0, 1.0),
        progress,
        months_remaining,
        required_monthly,
        capacity_ratio,
    };

    // Already funded: nothing left to estimate.
    if raw_progress >= 1.0 {
        return outlook(1.0, months_remaining.map(|_| 0.0), None);
    }

    if let Some(months) = months_remaining {
        if months <= 0.0 {
            return outlook(progress, None, None);
        }
    }

    let mut probability = BASE_PROBABILITY;

    if raw_progress > 0.5 {
        probability += 0.2;
    }
    if raw_progress > 0.75 {
        probability += 0.2;
    }

    let mut required_monthly = None;
    let mut capacity_ratio = None;

    if let Some(months) = months_remaining {
        let required = goal.remaining_amount() / months;
        let ratio = if required > 0.0 {
            profile.monthly_savings_capacity / required
        } else {
            f64::INFINITY
        };

        probability += if ratio >= 1.2 {
            0.2
        } else if ratio >= 1.0 {
            0.1
        } else if ratio < 0.8 {
            -0.3
        } else if ratio < 0.6 {
            // Unreachable: shadowed by `< 0.8`. Kept to preserve the band order.
            -0.5
        } else {
            0.0
        };

        if months > 12.0 {
            probability += 0.1;
        } else if months < 3.0 {
            probability -= 0.3;
        }

        required_monthly = Some(required);
        capacity_ratio = Some(ratio);
    }

    if goal.goal_type == GoalType::Investment {
        match market.trend {
            MarketTrend::Bullish => probability += 0.1,
            MarketTrend::Bearish => probability -= 0.1,
            MarketTrend::Neutral => {}
        }
    }

    outlook(probability, required_monthly, capacity_ratio)
}

/// Ordered, independently triggered recommendations.
pub fn generate_recommendations(
    goal: &Goal,
    profile: &UserProfile,
    patterns: &SpendingPatterns,
    as_of: NaiveDate,
) -> Vec<Recommendation> {
    let mut out = Vec::new();
    let outlook = calculate_goal_probability(goal, profile, &MarketConditions::default(), as_of);
    let capacity = profile.monthly_savings_capacity;

    if let Some(required) = outlook.required_monthly {
        if required > capacity {
            let shortfall = required - capacity;
            out.push(Recommendation {
                kind: RecommendationType::BudgetOptimization,
                priority: Level::High,
                title: "Close the monthly savings gap".to_string(),
                description: format!(
                    "You need ${required:.2}/month but can currently save ${capacity:.2}/month, a shortfall of ${shortfall:.2}."
                ),
                action: format!("Find ${shortfall:.2} of monthly cuts or reallocations."),
                impact: Level::High,
                effort: Level::Medium,
            });
        }
    }

    if outlook.probability < 0.3 && goal.deadline.is_some() && capacity > 0.0 {
        let months_needed = (goal.remaining_amount() / capacity).ceil();
        if let Some(extended) = add_months(as_of, months_needed) {
            out.push(Recommendation {
                kind: RecommendationType::TimelineAdjustment,
                priority: Level::Medium,
                title: "Extend the goal deadline".to_string(),
                description: format!(
                    "At ${capacity:.2}/month the remaining ${:.2} takes {months_needed} months.",
                    goal.remaining_amount()
                ),
                action: format!("Move the deadline to {extended}."),
                impact: Level::Medium,
                effort: Level::Low,
            });
        }
    }

    if profile.income_growth_rate < LOW_INCOME_GROWTH {
        out.push(Recommendation {
            kind: RecommendationType::IncomeOptimization,
            priority: Level::Medium,
            title: "Grow your income".to_string(),
            description: format!(
                "Income is growing {:.1}% per period, below the {LOW_INCOME_GROWTH:.0}% mark.",
                profile.income_growth_rate
            ),
            action: "Consider a raise negotiation, side income, or upskilling.".to_string(),
            impact: Level::High,
            effort: Level::High,
        });
    }

    let top = patterns.top_categories(3);
    if !top.is_empty() {
        let names = top.join(", ");
        out.push(Recommendation {
            kind: RecommendationType::SpendingOptimization,
            priority: Level::Low,
            title: "Review your largest spending categories".to_string(),
            description: format!("Most of your spending goes to: {names}."),
            action: format!("Set category budgets for {names}."),
            impact: Level::Medium,
            effort: Level::Low,
        });
    }

    out
}

/// Independent risk rules for one goal.
pub fn assess_risks(
    goal: &Goal,
    profile: &UserProfile,
    market: &MarketConditions,
    as_of: NaiveDate,
) -> Vec<Risk> {
    let mut out = Vec::new();
    let months_remaining = goal.deadline.map(|d| months_between(as_of, d));

    if let Some(months) = months_remaining {
        if months < 6.0 {
            out.push(Risk {
                kind: RiskType::Time,
                severity: if months < 3.0 { Level::High } else { Level::Medium },
                description: format!("Only {:.1} months remain until the deadline.", months.max(0.0)),
                mitigation: "Prioritise this goal or extend the deadline.".to_string(),
            });
        }

        if months > 0.0 {
            let required = goal.remaining_amount() / months;
            if profile.monthly_savings_capacity < 0.8 * required {
                out.push(Risk {
                    kind: RiskType::Capacity,
                    severity: Level::High,
                    description: format!(
                        "Savings capacity ${:.2}/month is well below the ${required:.2}/month required.",
                        profile.monthly_savings_capacity
                    ),
                    mitigation: "Reduce expenses or lower the target amount.".to_string(),
                });
            }
        }
    }

    if goal.goal_type == GoalType::Investment && market.volatility > HIGH_MARKET_VOLATILITY {
        out.push(Risk {
            kind: RiskType::Market,
            severity: Level::Medium,
            description: format!("Market volatility is elevated ({:.0}%).", market.volatility * 100.0),
            mitigation: "Diversify holdings and avoid timing the market.".to_string(),
        });
    }

    if let Some(months) = months_remaining {
        let elapsed = months_between(goal.created_at, as_of).max(0.0);
        let remaining = months.max(0.0);
        let total = elapsed + remaining;
        if total > 0.0 {
            let expected = elapsed / total;
            let progress = goal.raw_progress();
            if progress < 0.8 * expected {
                out.push(Risk {
                    kind: RiskType::Progress,
                    severity: Level::Medium,
                    description: format!(
                        "Progress is {:.0}% against an expected {:.0}% at this point.",
                        progress * 100.0,
                        expected * 100.0
                    ),
                    mitigation: "Increase contributions to catch up with the schedule.".to_string(),
                });
            }
        }
    }

    out
}

/// Fractional months from `from` to `to` (negative if `to` is earlier).
pub fn months_between(from: NaiveDate, to: NaiveDate) -> f64 {
    (to - from).num_days() as f64 / DAYS_PER_MONTH
}

fn add_months(date: NaiveDate, months: f64) -> Option<NaiveDate> {
    if !(months.is_finite() && months >= 0.0 && months <= u32::MAX as f64) {
        return None;
    }
    date.checked_add_months(Months::new(months as u32))
}
