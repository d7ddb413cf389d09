use std::io::Write;

use chrono::NaiveDate;
use fin_forecast::app::pipeline::run_training;
use fin_forecast::categorize::CategorizationScorer;
use fin_forecast::data::{process, seed_records, split};
use fin_forecast::domain::{
    Algorithm, Goal, GoalStatus, GoalType, Level, MarketConditions, MarketTrend, RiskTolerance,
    SpendingCategory, Target, TrainConfig, Transaction, TransactionType, TrendDirection,
    UserProfile,
};
use fin_forecast::fit::{exponential_regression, linear_regression, polynomial_regression};
use fin_forecast::forecast::{calculate_goal_probability, predict_spending_trend};
use fin_forecast::io::{load_transactions, read_models_json, write_models_json};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn expense(amount: f64, on: NaiveDate) -> Transaction {
    Transaction {
        amount,
        transaction_type: TransactionType::Expense,
        category: "food".to_string(),
        description: "groceries".to_string(),
        transaction_date: on,
    }
}

#[test]
fn regressions_recover_noise_free_parameters() {
    let x: Vec<f64> = (0..8).map(f64::from).collect();

    let y: Vec<f64> = x.iter().map(|v| -1.5 * v + 4.0).collect();
    let fit = linear_regression(&x, &y).unwrap();
    assert!((fit.slope() + 1.5).abs() < 1e-9);
    assert!((fit.r_squared() - 1.0).abs() < 1e-9);

    let y: Vec<f64> = x.iter().map(|v| 1.0 - 2.0 * v + 0.5 * v * v).collect();
    let fit = polynomial_regression(&x, &y, 2).unwrap();
    assert!((fit.predict(10.0) - 31.0).abs() < 1e-6);

    let y: Vec<f64> = x.iter().map(|v| 3.0 * (0.2 * v).exp()).collect();
    let fit = exponential_regression(&x, &y).unwrap();
    assert!((fit.predict(10.0) - 3.0 * 2.0_f64.exp()).abs() < 1e-6);
}

#[test]
fn one_monthly_bucket_is_insufficient_data() {
    let as_of = date(2025, 6, 30);
    let tx = [expense(120.0, date(2025, 6, 2)), expense(80.0, date(2025, 6, 20))];
    let forecast = predict_spending_trend(&tx, 6, as_of);
    assert_eq!(forecast.trend, TrendDirection::InsufficientData);
    assert!(forecast.prediction.is_none());
    assert_eq!(forecast.confidence, 0.0);
}

#[test]
fn spending_forecast_from_csv() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "amount,transaction_type,category,description,transaction_date").unwrap();
    for (month, amount) in [(1, 100.0), (2, 200.0), (3, 300.0), (4, 400.0)] {
        writeln!(file, "{amount},expense,food,Groceries,2025-{month:02}-10").unwrap();
    }
    writeln!(file, "5000,income,salary,Payroll,2025-04-01").unwrap();

    let transactions = load_transactions(file.path()).unwrap().transactions;
    let forecast = predict_spending_trend(&transactions, 6, date(2025, 4, 30));
    let prediction = forecast.prediction.unwrap();

    assert_eq!(forecast.trend, TrendDirection::Increasing);
    assert_eq!(prediction.monthly_totals.len(), 4);
    assert_eq!(prediction.next_months.len(), 3);
    assert!((prediction.next_months[0] - 500.0).abs() < 1e-6);
    assert!(forecast.confidence <= 0.95);
}

#[test]
fn funded_goal_scores_high_regardless_of_deadline() {
    let profile = UserProfile {
        monthly_savings_capacity: 0.0,
        income_growth_rate: 0.0,
        expense_reduction_rate: 0.0,
        risk_tolerance: RiskTolerance::Conservative,
    };
    let market = MarketConditions {
        trend: MarketTrend::Bearish,
        volatility: 0.5,
    };
    for deadline in [None, Some(date(2020, 1, 1)), Some(date(2025, 7, 1)), Some(date(2030, 1, 1))] {
        let goal = Goal {
            id: "funded".to_string(),
            goal_type: GoalType::Investment,
            target_amount: 5_000.0,
            current_amount: 5_000.0,
            deadline,
            priority: Level::Low,
            status: GoalStatus::Active,
            created_at: date(2024, 1, 1),
        };
        let outlook = calculate_goal_probability(&goal, &profile, &market, date(2025, 6, 1));
        assert!(outlook.probability >= 0.9);
    }
}

#[test]
fn categorizer_falls_back_to_other() {
    let scorer = CategorizationScorer::new();
    for text in ["", "xyzzy_no_match"] {
        let p = scorer.predict_category(text);
        assert_eq!(p.category, SpendingCategory::Other);
        assert!(p.confidence <= 0.1);
    }
}

#[test]
fn seed_table_savings_capacity_is_income_minus_expenses() {
    let dataset = process(&seed_records()).unwrap();
    let expected = [46_500.0, 70_500.0, 89_500.0, 38_800.0, 64_200.0];
    assert_eq!(dataset.target(Target::SavingsCapacity), &expected);

    let split = split(&dataset, 0.2, 42).unwrap();
    assert_eq!(split.test.len(), 1);
    assert_eq!(split.train.len(), 4);
}

#[test]
fn training_run_round_trips_through_json() {
    let config = TrainConfig {
        dataset: None,
        sample_count: 80,
        test_ratio: 0.25,
        seed: 9,
        algorithms: vec![Algorithm::Linear, Algorithm::Polynomial { degree: 2 }],
        export_models: None,
    };
    let run = run_training(&config).unwrap();
    assert_eq!(run.report.train_size, 60);
    assert_eq!(run.report.test_size, 20);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("models.json");
    write_models_json(&path, &run.report).unwrap();
    let store = read_models_json(&path).unwrap().into_store();

    assert_eq!(store.len(), Target::ALL.len());
    for target in Target::ALL {
        let a = run.trainer.predict(target, 50.0).unwrap();
        let b = store.predict(target, 50.0).unwrap();
        assert!((a - b).abs() <= 1e-9 * a.abs().max(1.0));
    }
}
