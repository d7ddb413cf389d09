//! Built-in training records: the fixed seed table and a seeded generator.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{CellValue, RawRecord};
use crate::error::AppError;

const SPENDING_LABELS: [&str; 3] = ["low", "medium", "high"];
const RISK_LABELS: [&str; 3] = ["conservative", "moderate", "aggressive"];
const GOAL_LABELS: [&str; 5] = ["savings", "debt_payoff", "investment", "purchase", "retirement"];

/// One seed row: age, income, monthly expenses, debt, credit score, savings
/// rate, spending level, risk tolerance, goal focus.
type SeedRow = (f64, f64, f64, f64, f64, f64, &'static str, &'static str, &'static str);

const SEED_TABLE: [SeedRow; 5] = [
    (25.0, 50_000.0, 3_500.0, 15_000.0, 680.0, 0.10, "medium", "moderate", "savings"),
    (35.0, 75_000.0, 4_500.0, 25_000.0, 720.0, 0.15, "low", "conservative", "purchase"),
    (45.0, 95_000.0, 5_500.0, 10_000.0, 780.0, 0.20, "medium", "moderate", "retirement"),
    (28.0, 42_000.0, 3_200.0, 30_000.0, 590.0, 0.05, "high", "aggressive", "debt_payoff"),
    (62.0, 68_000.0, 3_800.0, 5_000.0, 810.0, 0.25, "low", "conservative", "retirement"),
];

/// The fixed five-record seed dataset.
pub fn seed_records() -> Vec<RawRecord> {
    SEED_TABLE
        .iter()
        .map(|&(age, income, expenses, debt, credit, rate, spending, risk, goal)| {
            record(age, income, expenses, debt, credit, rate, spending, risk, goal)
        })
        .collect()
}

/// Generate `count` synthetic records from a fixed seed.
///
/// Income scales with age; expenses and debt scale with income. Draws are
/// clamped to plausible ranges so every record survives processing.
pub fn generate_records(count: usize, seed: u64) -> Result<Vec<RawRecord>, AppError> {
    if count == 0 {
        return Err(AppError::invalid_input("Sample count must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::Numeric(format!("Noise distribution error: {e}")))?;

    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        let age = rng.gen_range(18.0_f64..=75.0).round();
        let income = (30_000.0 + 1_200.0 * (age - 18.0) + 12_000.0 * normal.sample(&mut rng))
            .clamp(12_000.0, 250_000.0)
            .round();
        let expense_share = (0.6 + 0.15 * normal.sample(&mut rng)).clamp(0.3, 1.1);
        let monthly_expenses = (income / 12.0 * expense_share).round();
        let debt = (income * rng.gen_range(0.0..0.8)).round();
        let credit = (700.0 + 60.0 * normal.sample(&mut rng)).clamp(300.0, 850.0).round();
        let savings_rate = ((1.0 - expense_share).max(0.0) * 100.0).round() / 100.0;

        records.push(record(
            age,
            income,
            monthly_expenses,
            debt,
            credit,
            savings_rate,
            pick(&mut rng, &SPENDING_LABELS),
            pick(&mut rng, &RISK_LABELS),
            pick(&mut rng, &GOAL_LABELS),
        ));
    }
    Ok(records)
}

fn pick(rng: &mut StdRng, labels: &[&'static str]) -> &'static str {
    labels.choose(rng).copied().unwrap_or("")
}

#[allow(clippy::too_many_arguments)]
fn record(
    age: f64,
    income: f64,
    monthly_expenses: f64,
    debt_amount: f64,
    credit_score: f64,
    savings_rate: f64,
    spending_category: &str,
    risk_tolerance: &str,
    financial_goals: &str,
) -> RawRecord {
    let mut r = RawRecord::new();
    r.insert("age".to_string(), CellValue::Number(age));
    r.insert("income".to_string(), CellValue::Number(income));
    r.insert("monthly_expenses".to_string(), CellValue::Number(monthly_expenses));
    r.insert("debt_amount".to_string(), CellValue::Number(debt_amount));
    r.insert("credit_score".to_string(), CellValue::Number(credit_score));
    r.insert("savings_rate".to_string(), CellValue::Number(savings_rate));
    r.insert("spending_category".to_string(), CellValue::Text(spending_category.to_string()));
    r.insert("risk_tolerance".to_string(), CellValue::Text(risk_tolerance.to_string()));
    r.insert("financial_goals".to_string(), CellValue::Text(financial_goals.to_string()));
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_table_has_five_complete_records() {
        let records = seed_records();
        assert_eq!(records.len(), 5);
        assert!(records.iter().all(|r| r.len() == 9));
        assert_eq!(records[3]["credit_score"], CellValue::Number(590.0));
    }

    #[test]
    fn generator_is_deterministic_per_seed() {
        let a = generate_records(25, 42).unwrap();
        let b = generate_records(25, 42).unwrap();
        let c = generate_records(25, 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn generated_values_stay_in_range() {
        for r in generate_records(200, 1).unwrap() {
            let age = r["age"].as_f64().unwrap();
            let credit = r["credit_score"].as_f64().unwrap();
            assert!((18.0..=75.0).contains(&age));
            assert!((300.0..=850.0).contains(&credit));
            assert!(r["income"].as_f64().unwrap() >= 12_000.0);
        }
    }

    #[test]
    fn zero_count_is_rejected() {
        assert!(generate_records(0, 1).is_err());
    }
}
