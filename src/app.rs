//! Top-level application orchestration.
//!
//! `src/main.rs` only parses arguments and installs logging; this module is the
//! "real main" that loads environment defaults, runs the requested analysis,
//! prints reports and writes optional exports.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::categorize::CategorizationScorer;
use crate::cli::{
    CategorizeArgs, Cli, Command, GoalArgs, PredictArgs, SpendingArgs, TrainArgs, TrendArgs,
};
use crate::domain::{
    Algorithm, CategoryPrediction, Goal, GoalStatus, MarketConditions, Target, TrainConfig, UserProfile,
};
use crate::error::AppError;
use crate::forecast::{
    SpendingPatterns, evaluate_goal, predict_income_growth, predict_savings_capacity,
    predict_spending_trend,
};
use crate::io::{load_transactions, read_models_json, write_models_json};
use crate::report;

pub mod pipeline;

const DEFAULT_SEED: u64 = 42;
const DEFAULT_TEST_RATIO: f64 = 0.2;

/// Defaults read from the environment (and an optional `.env`).
///
/// CLI flags override every field.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDefaults {
    pub seed: u64,
    pub test_ratio: f64,
    pub dataset: Option<PathBuf>,
}

impl Default for ForecastDefaults {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            test_ratio: DEFAULT_TEST_RATIO,
            dataset: None,
        }
    }
}

impl ForecastDefaults {
    /// Read `FINFC_SEED`, `FINFC_TEST_RATIO` and `FINFC_DATASET`.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut defaults = Self::default();

        if let Some(raw) = lookup("FINFC_SEED") {
            defaults.seed = raw
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("FINFC_SEED must be an integer, got '{raw}'.")))?;
        }
        if let Some(raw) = lookup("FINFC_TEST_RATIO") {
            defaults.test_ratio = raw.trim().parse().map_err(|_| {
                AppError::Config(format!("FINFC_TEST_RATIO must be a number, got '{raw}'."))
            })?;
        }
        if let Some(raw) = lookup("FINFC_DATASET") {
            let raw = raw.trim();
            if !raw.is_empty() {
                defaults.dataset = Some(PathBuf::from(raw));
            }
        }

        Ok(defaults)
    }
}

/// Run the parsed command.
pub fn run(cli: Cli) -> Result<(), AppError> {
    // A missing .env is normal.
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "loaded .env");
    }

    match cli.command {
        Command::Train(args) => handle_train(&args),
        Command::Predict(args) => handle_predict(&args),
        Command::Categorize(args) => handle_categorize(&args),
        Command::Trend(args) => handle_trend(&args),
        Command::Spending(args) => handle_spending(&args),
        Command::Goal(args) => handle_goal(&args),
    }
}

fn handle_train(args: &TrainArgs) -> Result<(), AppError> {
    let defaults = ForecastDefaults::from_env()?;
    let config = train_config_from_args(args, &defaults);
    let run = pipeline::run_training(&config)?;

    println!("{}", report::format_training_report(&run.report, &config));

    if let Some(path) = &config.export_models {
        write_models_json(path, &run.report)?;
        info!(path = %path.display(), "wrote model JSON");
    }
    Ok(())
}

/// Merge CLI flags over environment defaults.
pub fn train_config_from_args(args: &TrainArgs, defaults: &ForecastDefaults) -> TrainConfig {
    let algorithms = if args.algorithms.is_empty() {
        Algorithm::DEFAULTS.to_vec()
    } else {
        args.algorithms.clone()
    };

    TrainConfig {
        dataset: args.dataset.clone().or_else(|| defaults.dataset.clone()),
        sample_count: args.sample_count,
        test_ratio: args.test_ratio.unwrap_or(defaults.test_ratio),
        seed: args.seed.unwrap_or(defaults.seed),
        algorithms,
        export_models: args.export.clone(),
    }
}

fn handle_predict(args: &PredictArgs) -> Result<(), AppError> {
    let store = read_models_json(&args.models)?.into_store();
    if store.is_empty() {
        return Err(AppError::dataset_load("Model file contains no models."));
    }

    println!("Predictions for age={}:", args.age);
    for target in Target::ALL {
        if let Some(value) = store.predict(target, args.age) {
            println!("  {:<18} {value:>14.4}", target.as_str());
        }
    }
    Ok(())
}

fn handle_categorize(args: &CategorizeArgs) -> Result<(), AppError> {
    let scorer = CategorizationScorer::new();

    let (descriptions, predictions): (Vec<String>, Vec<CategoryPrediction>) = match &args.transactions {
        Some(path) => {
            let transactions = load_transactions(path)?.transactions;
            let predictions = scorer.categorize_transactions(&transactions);
            let descriptions = transactions.into_iter().map(|t| t.description).collect();
            (descriptions, predictions)
        }
        None if !args.descriptions.is_empty() => {
            let predictions = args
                .descriptions
                .iter()
                .map(|d| scorer.predict_category(d))
                .collect();
            (args.descriptions.clone(), predictions)
        }
        None => {
            return Err(AppError::invalid_input(
                "Provide descriptions or --transactions <CSV>.",
            ));
        }
    };

    println!("{}", report::format_categorizations(&descriptions, &predictions));
    Ok(())
}

fn handle_trend(args: &TrendArgs) -> Result<(), AppError> {
    check_finite("income", &args.income)?;
    check_finite("expenses", &args.expenses)?;

    let income = predict_income_growth(&args.income, args.months);
    println!("{}", report::format_income_forecast(&income));

    if !args.expenses.is_empty() {
        let savings = predict_savings_capacity(&args.income, &args.expenses, args.months);
        println!("{}", report::format_savings_forecast(&savings));
    }
    Ok(())
}

fn handle_spending(args: &SpendingArgs) -> Result<(), AppError> {
    let transactions = load_transactions(&args.transactions)?.transactions;
    let as_of = args.as_of.unwrap_or_else(today);
    let forecast = predict_spending_trend(&transactions, args.months, as_of);
    println!("{}", report::format_spending_forecast(&forecast));
    Ok(())
}

fn handle_goal(args: &GoalArgs) -> Result<(), AppError> {
    let as_of = args.as_of.unwrap_or_else(today);
    let goal = Goal {
        id: args.id.clone(),
        goal_type: args.goal_type,
        target_amount: args.target,
        current_amount: args.current,
        deadline: args.deadline,
        priority: args.priority,
        status: GoalStatus::Active,
        created_at: args.created.unwrap_or(as_of),
    };
    goal.validate()?;

    let profile = UserProfile {
        monthly_savings_capacity: args.capacity,
        income_growth_rate: args.income_growth,
        expense_reduction_rate: args.expense_reduction,
        risk_tolerance: args.risk,
    };
    let market = MarketConditions {
        trend: args.market,
        volatility: args.volatility,
    };
    let patterns = match &args.transactions {
        Some(path) => spending_patterns(path)?,
        None => SpendingPatterns::default(),
    };

    let goal_report = evaluate_goal(&goal, &profile, &market, &patterns, as_of);
    println!("{}", report::format_goal_report(&goal, &goal_report));
    Ok(())
}

fn spending_patterns(path: &Path) -> Result<SpendingPatterns, AppError> {
    let transactions = load_transactions(path)?.transactions;
    Ok(SpendingPatterns::from_transactions(&transactions))
}

fn check_finite(name: &str, values: &[f64]) -> Result<(), AppError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(AppError::invalid_input(format!("`{name}` contains non-finite values.")))
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn train_args() -> TrainArgs {
        TrainArgs {
            dataset: None,
            sample_count: 0,
            test_ratio: None,
            seed: None,
            algorithms: Vec::new(),
            export: None,
        }
    }

    #[test]
    fn env_defaults_parse_and_override_builtins() {
        let defaults = ForecastDefaults::from_lookup(|key| match key {
            "FINFC_SEED" => Some("7".to_string()),
            "FINFC_TEST_RATIO" => Some(" 0.3 ".to_string()),
            "FINFC_DATASET" => Some("data.csv".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(defaults.seed, 7);
        assert_eq!(defaults.test_ratio, 0.3);
        assert_eq!(defaults.dataset, Some(PathBuf::from("data.csv")));

        assert_eq!(ForecastDefaults::from_lookup(|_| None).unwrap(), ForecastDefaults::default());
    }

    #[test]
    fn bad_env_values_are_config_errors() {
        let err = ForecastDefaults::from_lookup(|key| (key == "FINFC_SEED").then(|| "x".to_string()))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn cli_flags_override_env_defaults() {
        let defaults = ForecastDefaults {
            seed: 7,
            test_ratio: 0.3,
            dataset: Some(PathBuf::from("env.csv")),
        };

        let config = train_config_from_args(&train_args(), &defaults);
        assert_eq!(config.seed, 7);
        assert_eq!(config.test_ratio, 0.3);
        assert_eq!(config.dataset, Some(PathBuf::from("env.csv")));
        assert_eq!(config.algorithms, Algorithm::DEFAULTS.to_vec());

        let args = TrainArgs {
            seed: Some(1),
            test_ratio: Some(0.5),
            dataset: Some(PathBuf::from("flag.csv")),
            algorithms: vec![Algorithm::Linear],
            ..train_args()
        };
        let config = train_config_from_args(&args, &defaults);
        assert_eq!(config.seed, 1);
        assert_eq!(config.test_ratio, 0.5);
        assert_eq!(config.dataset, Some(PathBuf::from("flag.csv")));
        assert_eq!(config.algorithms, vec![Algorithm::Linear]);
    }

    #[test]
    fn non_finite_history_is_rejected() {
        assert!(check_finite("income", &[1.0, f64::NAN]).is_err());
        assert!(check_finite("income", &[1.0, 2.0]).is_ok());
    }
}
