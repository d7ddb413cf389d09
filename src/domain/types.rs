//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - built per invocation from caller-supplied records
//! - exported to JSON alongside trained models
//! - rendered by the report module

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Concrete fitted model kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Linear,
    Polynomial,
    Exponential,
    /// Constant-mean fallback used when a real fit is impossible.
    Mean,
}

impl ModelKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Linear => "linear",
            ModelKind::Polynomial => "polynomial",
            ModelKind::Exponential => "exponential",
            ModelKind::Mean => "constant mean",
        }
    }
}

/// A candidate regression algorithm for training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Algorithm {
    Linear,
    Polynomial { degree: usize },
    Exponential,
}

impl Algorithm {
    /// The candidate set trained when the caller does not choose one.
    pub const DEFAULTS: [Algorithm; 3] = [
        Algorithm::Linear,
        Algorithm::Polynomial { degree: 2 },
        Algorithm::Exponential,
    ];

    pub fn kind(self) -> ModelKind {
        match self {
            Algorithm::Linear => ModelKind::Linear,
            Algorithm::Polynomial { .. } => ModelKind::Polynomial,
            Algorithm::Exponential => ModelKind::Exponential,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Linear => write!(f, "linear"),
            Algorithm::Polynomial { degree } => write!(f, "polynomial:{degree}"),
            Algorithm::Exponential => write!(f, "exponential"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = String;

    /// Accepts `linear`, `exponential`, `polynomial` (degree 2) or `polynomial:N`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.split_once(':') {
            None => match s.as_str() {
                "linear" => Ok(Algorithm::Linear),
                "exponential" | "exp" => Ok(Algorithm::Exponential),
                "polynomial" | "poly" => Ok(Algorithm::Polynomial { degree: 2 }),
                other => Err(format!("Unknown algorithm '{other}'")),
            },
            Some(("polynomial" | "poly", degree)) => degree
                .parse::<usize>()
                .map(|degree| Algorithm::Polynomial { degree })
                .map_err(|_| format!("Invalid polynomial degree '{degree}'")),
            Some(_) => Err(format!("Unknown algorithm '{s}'")),
        }
    }
}

/// Direction of a fitted trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

impl TrendDirection {
    /// Classify a per-period slope relative to the series level.
    ///
    /// Moves smaller than 1% of the mean per period count as stable.
    pub fn from_slope(slope: f64, level: f64) -> Self {
        let band = 0.01 * level.abs();
        if slope > band {
            TrendDirection::Increasing
        } else if slope < -band {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
            TrendDirection::InsufficientData => "insufficient_data",
        }
    }
}

/// Shared low/medium/high scale used for goal priority, recommendation
/// priority, impact, effort and risk severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    Savings,
    Investment,
    DebtPayoff,
    Purchase,
    Income,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Active,
    Completed,
    Paused,
    Cancelled,
}

/// A financial goal as supplied by the caller.
///
/// `current_amount` may exceed `target_amount` after over-contribution;
/// [`Goal::progress`] clamps for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub goal_type: GoalType,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: Option<NaiveDate>,
    pub priority: Level,
    pub status: GoalStatus,
    pub created_at: NaiveDate,
}

impl Goal {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.target_amount.is_finite() && self.target_amount > 0.0) {
            return Err(AppError::invalid_input(format!(
                "Goal '{}': target_amount must be > 0.",
                self.id
            )));
        }
        if !(self.current_amount.is_finite() && self.current_amount >= 0.0) {
            return Err(AppError::invalid_input(format!(
                "Goal '{}': current_amount must be >= 0.",
                self.id
            )));
        }
        Ok(())
    }

    /// Raw progress ratio (may exceed 1.0).
    pub fn raw_progress(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return 1.0;
        }
        self.current_amount / self.target_amount
    }

    /// Display progress in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.raw_progress().clamp(0.0, 1.0)
    }

    pub fn remaining_amount(&self) -> f64 {
        (self.target_amount - self.current_amount).max(0.0)
    }
}

/// Investor risk appetite; also the `risk_tolerance` dataset field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskTolerance {
    /// Map a raw label; unknown values fall back to `Moderate`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "conservative" | "low" => RiskTolerance::Conservative,
            "aggressive" | "high" => RiskTolerance::Aggressive,
            _ => RiskTolerance::Moderate,
        }
    }

    pub fn encode(self) -> f64 {
        match self {
            RiskTolerance::Conservative => 0.0,
            RiskTolerance::Moderate => 1.0,
            RiskTolerance::Aggressive => 2.0,
        }
    }
}

/// Per-invocation savings profile derived by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub monthly_savings_capacity: f64,
    /// Income growth per period, in percent.
    pub income_growth_rate: f64,
    /// Expense reduction per period, in percent.
    pub expense_reduction_rate: f64,
    pub risk_tolerance: RiskTolerance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MarketTrend {
    Bullish,
    Neutral,
    Bearish,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConditions {
    pub trend: MarketTrend,
    pub volatility: f64,
}

impl Default for MarketConditions {
    fn default() -> Self {
        Self {
            trend: MarketTrend::Neutral,
            volatility: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            _ => None,
        }
    }
}

/// A transaction as consumed from the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub category: String,
    pub description: String,
    pub transaction_date: NaiveDate,
}

/// Spending categories known to the keyword scorer, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendingCategory {
    Housing,
    Food,
    Transportation,
    Utilities,
    Healthcare,
    Entertainment,
    Shopping,
    Other,
}

impl SpendingCategory {
    pub const ALL: [SpendingCategory; 8] = [
        SpendingCategory::Housing,
        SpendingCategory::Food,
        SpendingCategory::Transportation,
        SpendingCategory::Utilities,
        SpendingCategory::Healthcare,
        SpendingCategory::Entertainment,
        SpendingCategory::Shopping,
        SpendingCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SpendingCategory::Housing => "housing",
            SpendingCategory::Food => "food",
            SpendingCategory::Transportation => "transportation",
            SpendingCategory::Utilities => "utilities",
            SpendingCategory::Healthcare => "healthcare",
            SpendingCategory::Entertainment => "entertainment",
            SpendingCategory::Shopping => "shopping",
            SpendingCategory::Other => "other",
        }
    }
}

impl fmt::Display for SpendingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of categorizing one free-text description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPrediction {
    pub category: SpendingCategory,
    pub confidence: f64,
    pub scores: BTreeMap<SpendingCategory, f64>,
}

/// Encoded `spending_category` dataset field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendingLevel {
    Low,
    Medium,
    High,
}

impl SpendingLevel {
    /// Map a raw label; unknown values fall back to `Medium`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" | "frugal" => SpendingLevel::Low,
            "high" | "lavish" => SpendingLevel::High,
            _ => SpendingLevel::Medium,
        }
    }

    pub fn encode(self) -> f64 {
        match self {
            SpendingLevel::Low => 0.0,
            SpendingLevel::Medium => 1.0,
            SpendingLevel::High => 2.0,
        }
    }
}

/// Encoded `financial_goals` dataset field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalFocus {
    Savings,
    DebtPayoff,
    Investment,
    Purchase,
    Retirement,
}

impl GoalFocus {
    /// Map a raw label; unknown values fall back to `Investment` (the mid code).
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "savings" | "emergency_fund" => GoalFocus::Savings,
            "debt_payoff" | "debt" => GoalFocus::DebtPayoff,
            "purchase" | "home_purchase" => GoalFocus::Purchase,
            "retirement" => GoalFocus::Retirement,
            _ => GoalFocus::Investment,
        }
    }

    pub fn encode(self) -> f64 {
        match self {
            GoalFocus::Savings => 0.0,
            GoalFocus::DebtPayoff => 1.0,
            GoalFocus::Investment => 2.0,
            GoalFocus::Purchase => 3.0,
            GoalFocus::Retirement => 4.0,
        }
    }
}

/// Derived regression targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    SavingsCapacity,
    SpendingTrend,
    RiskScore,
    GoalAchievement,
}

impl Target {
    pub const ALL: [Target; 4] = [
        Target::SavingsCapacity,
        Target::SpendingTrend,
        Target::RiskScore,
        Target::GoalAchievement,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Target::SavingsCapacity => "savings_capacity",
            Target::SpendingTrend => "spending_trend",
            Target::RiskScore => "risk_score",
            Target::GoalAchievement => "goal_achievement",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single cleaned cell from tabular input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            CellValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            CellValue::Number(_) => None,
        }
    }
}

/// A cleaned record: only non-empty cells survive.
pub type RawRecord = BTreeMap<String, CellValue>;

/// Feature column names, in the order of [`FeatureRow::values`].
pub const FEATURE_NAMES: [&str; 9] = [
    "age",
    "income",
    "monthly_expenses",
    "debt_amount",
    "credit_score",
    "savings_rate",
    "spending_category",
    "risk_tolerance",
    "financial_goals",
];

/// Numeric feature vector for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub age: f64,
    pub income: f64,
    pub monthly_expenses: f64,
    pub debt_amount: f64,
    pub credit_score: f64,
    pub savings_rate: f64,
    pub spending_category: f64,
    pub risk_tolerance: f64,
    pub financial_goals: f64,
}

impl FeatureRow {
    pub fn values(&self) -> [f64; 9] {
        [
            self.age,
            self.income,
            self.monthly_expenses,
            self.debt_amount,
            self.credit_score,
            self.savings_rate,
            self.spending_category,
            self.risk_tolerance,
            self.financial_goals,
        ]
    }

    /// The single column used for regression training.
    pub fn first(&self) -> f64 {
        self.age
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub feature_names: Vec<String>,
    pub target_names: Vec<String>,
    pub record_count: usize,
}

/// Feature rows plus parallel target series.
///
/// Every target series has the same length as `features`; `record_ids` keeps
/// the original record position so splits can be audited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub features: Vec<FeatureRow>,
    pub targets: BTreeMap<Target, Vec<f64>>,
    pub record_ids: Vec<usize>,
    pub metadata: DatasetMetadata,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn target(&self, target: Target) -> &[f64] {
        self.targets.get(&target).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First feature column, the regression input.
    pub fn first_feature(&self) -> Vec<f64> {
        self.features.iter().map(FeatureRow::first).collect()
    }
}

/// Train/test partition.
#[derive(Debug, Clone)]
pub struct DatasetSplit {
    pub train: Dataset,
    pub test: Dataset,
}

/// A full training run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags plus environment defaults.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// CSV source; `None` means the built-in seed/synthetic data.
    pub dataset: Option<PathBuf>,
    /// Number of synthetic records to generate when no CSV is supplied
    /// (`0` uses the fixed seed table).
    pub sample_count: usize,
    pub test_ratio: f64,
    pub seed: u64,
    pub algorithms: Vec<Algorithm>,
    pub export_models: Option<PathBuf>,
}

impl TrainConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.test_ratio.is_finite() && (0.0..1.0).contains(&self.test_ratio)) {
            return Err(AppError::Config(format!(
                "Test ratio must be in [0, 1), got {}.",
                self.test_ratio
            )));
        }
        if self.algorithms.is_empty() {
            return Err(AppError::Config("At least one algorithm is required.".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_parses_polynomial_degree() {
        assert_eq!("poly:3".parse::<Algorithm>().unwrap(), Algorithm::Polynomial { degree: 3 });
        assert_eq!("Linear".parse::<Algorithm>().unwrap(), Algorithm::Linear);
        assert!("spline".parse::<Algorithm>().is_err());
    }

    #[test]
    fn unknown_encodings_default_to_mid_value() {
        assert_eq!(SpendingLevel::from_label("???").encode(), 1.0);
        assert_eq!(RiskTolerance::from_label("").encode(), 1.0);
        assert_eq!(GoalFocus::from_label("travel").encode(), 2.0);
    }

    #[test]
    fn progress_clamps_over_contribution() {
        let goal = Goal {
            id: "g1".to_string(),
            goal_type: GoalType::Savings,
            target_amount: 1000.0,
            current_amount: 1500.0,
            deadline: None,
            priority: Level::Medium,
            status: GoalStatus::Active,
            created_at: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        };
        assert_eq!(goal.progress(), 1.0);
        assert_eq!(goal.remaining_amount(), 0.0);
        assert!(goal.validate().is_ok());
    }

    #[test]
    fn trend_direction_uses_relative_band() {
        assert_eq!(TrendDirection::from_slope(5.0, 100.0), TrendDirection::Increasing);
        assert_eq!(TrendDirection::from_slope(0.5, 100.0), TrendDirection::Stable);
        assert_eq!(TrendDirection::from_slope(-2.0, 100.0), TrendDirection::Decreasing);
    }

    #[test]
    fn train_config_rejects_bad_ratio() {
        let config = TrainConfig {
            dataset: None,
            sample_count: 0,
            test_ratio: 1.0,
            seed: 1,
            algorithms: Algorithm::DEFAULTS.to_vec(),
            export_models: None,
        };
        assert!(config.validate().is_err());
    }
}
