//! Command-line parsing for `finfc`.
//!
//! Argument parsing and command dispatch stay separate from the modeling
//! code; `app.rs` turns these structs into library calls.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{Algorithm, GoalType, Level, MarketTrend, RiskTolerance};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "finfc", version, about = "Financial forecasting and goal-probability engine")]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Train per-target models on a CSV dataset or built-in sample data.
    Train(TrainArgs),
    /// Predict every target from a saved model JSON.
    Predict(PredictArgs),
    /// Assign spending categories to transaction descriptions.
    Categorize(CategorizeArgs),
    /// Income growth and savings capacity from monthly histories.
    Trend(TrendArgs),
    /// Forecast monthly spending from a transaction CSV.
    Spending(SpendingArgs),
    /// Goal probability, risks and recommendations.
    Goal(GoalArgs),
}

#[derive(Debug, Args, Clone)]
pub struct TrainArgs {
    /// CSV dataset (defaults to FINFC_DATASET, else built-in data).
    #[arg(long, value_name = "CSV")]
    pub dataset: Option<PathBuf>,

    /// Synthetic records to generate when no dataset is given (0 = seed table).
    #[arg(short = 'n', long, default_value_t = 0)]
    pub sample_count: usize,

    /// Share of records held out for testing (defaults to FINFC_TEST_RATIO, else 0.2).
    #[arg(long)]
    pub test_ratio: Option<f64>,

    /// Shuffle/generator seed (defaults to FINFC_SEED, else 42).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Candidate algorithm; repeat to compare several (linear, exponential, poly:N).
    #[arg(short, long = "algorithm", value_name = "ALGO")]
    pub algorithms: Vec<Algorithm>,

    /// Write the trained models to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PredictArgs {
    /// Model JSON produced by `finfc train --export`.
    #[arg(long, value_name = "JSON")]
    pub models: PathBuf,

    /// Input value for the first feature (age).
    #[arg(long)]
    pub age: f64,
}

#[derive(Debug, Args)]
pub struct CategorizeArgs {
    /// Transaction CSV; descriptions are read from its `description` column.
    #[arg(long, value_name = "CSV")]
    pub transactions: Option<PathBuf>,

    /// Free-text descriptions to categorize.
    pub descriptions: Vec<String>,
}

#[derive(Debug, Args)]
pub struct TrendArgs {
    /// Monthly income history, oldest first (comma-separated).
    #[arg(long, value_delimiter = ',', required = true)]
    pub income: Vec<f64>,

    /// Monthly expense history, oldest first (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub expenses: Vec<f64>,

    /// Periods to project.
    #[arg(long, default_value_t = 6)]
    pub months: usize,
}

#[derive(Debug, Args)]
pub struct SpendingArgs {
    /// Transaction CSV.
    #[arg(long, value_name = "CSV")]
    pub transactions: PathBuf,

    /// Trailing window in calendar months.
    #[arg(long, default_value_t = 6)]
    pub months: u32,

    /// Window end date (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct GoalArgs {
    #[arg(long, default_value = "goal")]
    pub id: String,

    #[arg(long, value_enum, default_value_t = GoalType::Savings)]
    pub goal_type: GoalType,

    #[arg(long)]
    pub target: f64,

    #[arg(long, default_value_t = 0.0)]
    pub current: f64,

    /// Deadline (YYYY-MM-DD).
    #[arg(long)]
    pub deadline: Option<NaiveDate>,

    /// Goal creation date (YYYY-MM-DD); defaults to the as-of date.
    #[arg(long)]
    pub created: Option<NaiveDate>,

    #[arg(long, value_enum, default_value_t = Level::Medium)]
    pub priority: Level,

    /// Monthly amount available for this goal.
    #[arg(long)]
    pub capacity: f64,

    /// Income growth per period, in percent.
    #[arg(long, default_value_t = 0.0)]
    pub income_growth: f64,

    /// Expense reduction per period, in percent.
    #[arg(long, default_value_t = 0.0)]
    pub expense_reduction: f64,

    #[arg(long, value_enum, default_value_t = RiskTolerance::Moderate)]
    pub risk: RiskTolerance,

    #[arg(long, value_enum, default_value_t = MarketTrend::Neutral)]
    pub market: MarketTrend,

    /// Market volatility (e.g. 0.25).
    #[arg(long, default_value_t = 0.0)]
    pub volatility: f64,

    /// Transaction CSV used for spending recommendations.
    #[arg(long, value_name = "CSV")]
    pub transactions: Option<PathBuf>,

    /// Evaluation date (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_algorithms() {
        let cli = Cli::parse_from(["finfc", "train", "-a", "linear", "-a", "poly:3", "--seed", "7"]);
        let Command::Train(args) = cli.command else {
            panic!("expected train");
        };
        assert_eq!(args.algorithms, vec![Algorithm::Linear, Algorithm::Polynomial { degree: 3 }]);
        assert_eq!(args.seed, Some(7));
        assert!(args.test_ratio.is_none());
    }

    #[test]
    fn parses_comma_separated_histories() {
        let cli = Cli::parse_from(["finfc", "-v", "trend", "--income", "1,2,3", "--expenses", "4,5"]);
        assert!(cli.verbose);
        let Command::Trend(args) = cli.command else {
            panic!("expected trend");
        };
        assert_eq!(args.income, vec![1.0, 2.0, 3.0]);
        assert_eq!(args.expenses, vec![4.0, 5.0]);
    }

    #[test]
    fn parses_goal_enums_and_dates() {
        let cli = Cli::parse_from([
            "finfc", "goal", "--goal-type", "debt-payoff", "--target", "1000", "--capacity", "50",
            "--deadline", "2026-01-31", "--market", "bearish",
        ]);
        let Command::Goal(args) = cli.command else {
            panic!("expected goal");
        };
        assert_eq!(args.goal_type, GoalType::DebtPayoff);
        assert_eq!(args.market, MarketTrend::Bearish);
        assert_eq!(args.deadline, NaiveDate::from_ymd_opt(2026, 1, 31));
    }
}
