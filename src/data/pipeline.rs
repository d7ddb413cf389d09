//! Feature extraction, target derivation, and train/test split.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::info;

use crate::domain::{
    CellValue, Dataset, DatasetMetadata, DatasetSplit, FEATURE_NAMES, FeatureRow, GoalFocus,
    RawRecord, RiskTolerance, SpendingLevel, Target,
};
use crate::error::AppError;

/// Turn cleaned records into features plus the four derived targets.
///
/// Missing or non-numeric numeric fields count as `0`; categorical fields fall
/// back to their mid encoding.
pub fn process(raw: &[RawRecord]) -> Result<Dataset, AppError> {
    if raw.is_empty() {
        return Err(AppError::dataset_load("Dataset contains no usable records."));
    }

    let mut features = Vec::with_capacity(raw.len());
    let mut targets: BTreeMap<Target, Vec<f64>> = Target::ALL
        .into_iter()
        .map(|t| (t, Vec::with_capacity(raw.len())))
        .collect();

    for record in raw {
        let row = extract_features(record);
        for (target, value) in derive_targets(&row) {
            if let Some(series) = targets.get_mut(&target) {
                series.push(value);
            }
        }
        features.push(row);
    }

    let metadata = DatasetMetadata {
        feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        target_names: Target::ALL.iter().map(|t| t.as_str().to_string()).collect(),
        record_count: features.len(),
    };
    info!(records = features.len(), "processed dataset");

    Ok(Dataset {
        record_ids: (0..features.len()).collect(),
        features,
        targets,
        metadata,
    })
}

fn extract_features(record: &RawRecord) -> FeatureRow {
    FeatureRow {
        age: number(record, "age"),
        income: number(record, "income"),
        monthly_expenses: number(record, "monthly_expenses"),
        debt_amount: number(record, "debt_amount"),
        credit_score: number(record, "credit_score"),
        savings_rate: number(record, "savings_rate"),
        spending_category: SpendingLevel::from_label(text(record, "spending_category")).encode(),
        risk_tolerance: RiskTolerance::from_label(text(record, "risk_tolerance")).encode(),
        financial_goals: GoalFocus::from_label(text(record, "financial_goals")).encode(),
    }
}

fn number(record: &RawRecord, field: &str) -> f64 {
    record.get(field).and_then(CellValue::as_f64).unwrap_or(0.0)
}

fn text<'a>(record: &'a RawRecord, field: &str) -> &'a str {
    record.get(field).and_then(CellValue::as_text).unwrap_or("")
}

/// Derive every target for one feature row, in [`Target::ALL`] order.
pub fn derive_targets(row: &FeatureRow) -> [(Target, f64); 4] {
    [
        (Target::SavingsCapacity, savings_capacity(row)),
        (Target::SpendingTrend, spending_trend(row)),
        (Target::RiskScore, risk_score(row)),
        (Target::GoalAchievement, goal_achievement(row)),
    ]
}

fn savings_capacity(row: &FeatureRow) -> f64 {
    row.income - row.monthly_expenses
}

fn spending_trend(row: &FeatureRow) -> f64 {
    if row.income == 0.0 {
        return 0.0;
    }
    row.monthly_expenses / row.income - 0.5
}

fn risk_score(row: &FeatureRow) -> f64 {
    let debt_to_income = if row.income == 0.0 {
        0.0
    } else {
        row.debt_amount / row.income
    };
    let credit_band = if row.credit_score < 600.0 {
        1.0
    } else if row.credit_score < 700.0 {
        0.5
    } else {
        0.0
    };
    let age_band = if row.age < 25.0 {
        0.3
    } else if row.age > 60.0 {
        0.2
    } else {
        0.0
    };
    (0.4 * debt_to_income + 0.4 * credit_band + 0.2 * age_band).clamp(0.0, 1.0)
}

fn goal_achievement(row: &FeatureRow) -> f64 {
    let monthly_savings = (row.income / 12.0 - row.monthly_expenses).max(0.0);
    let threshold = 0.2 * row.income / 12.0;
    if monthly_savings >= threshold || threshold <= 0.0 {
        1.0
    } else {
        monthly_savings / threshold
    }
}

/// Shuffle with a seeded RNG and split off `floor(n * test_ratio)` test rows.
pub fn split(dataset: &Dataset, test_ratio: f64, seed: u64) -> Result<DatasetSplit, AppError> {
    let mut rng = StdRng::seed_from_u64(seed);
    split_with_rng(dataset, test_ratio, &mut rng)
}

pub fn split_with_rng<R: rand::Rng + ?Sized>(
    dataset: &Dataset,
    test_ratio: f64,
    rng: &mut R,
) -> Result<DatasetSplit, AppError> {
    if !(test_ratio.is_finite() && (0.0..1.0).contains(&test_ratio)) {
        return Err(AppError::invalid_input(format!(
            "Test ratio must be in [0, 1), got {test_ratio}."
        )));
    }

    let n = dataset.len();
    let test_len = (n as f64 * test_ratio).floor() as usize;

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    let (test_idx, train_idx) = indices.split_at(test_len);

    info!(train = train_idx.len(), test = test_idx.len(), "split dataset");
    Ok(DatasetSplit {
        train: subset(dataset, train_idx),
        test: subset(dataset, test_idx),
    })
}

fn subset(dataset: &Dataset, indices: &[usize]) -> Dataset {
    let features: Vec<FeatureRow> = indices.iter().map(|&i| dataset.features[i].clone()).collect();
    let targets = dataset
        .targets
        .iter()
        .map(|(target, series)| (*target, indices.iter().map(|&i| series[i]).collect()))
        .collect();
    let record_ids = indices.iter().map(|&i| dataset.record_ids[i]).collect();

    Dataset {
        metadata: DatasetMetadata {
            record_count: features.len(),
            ..dataset.metadata.clone()
        },
        features,
        targets,
        record_ids,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::data::sample::{generate_records, seed_records};

    #[test]
    fn savings_capacity_matches_seed_table() {
        let raw = seed_records();
        let dataset = process(&raw).unwrap();
        assert_eq!(dataset.len(), 5);

        for (record, capacity) in raw.iter().zip(dataset.target(Target::SavingsCapacity)) {
            let income = record["income"].as_f64().unwrap();
            let expenses = record["monthly_expenses"].as_f64().unwrap();
            assert_eq!(*capacity, income - expenses);
        }
        assert_eq!(dataset.target(Target::SavingsCapacity)[0], 46_500.0);
    }

    #[test]
    fn every_target_is_aligned_with_features() {
        let dataset = process(&seed_records()).unwrap();
        for target in Target::ALL {
            assert_eq!(dataset.target(target).len(), dataset.features.len());
        }
        assert_eq!(dataset.metadata.record_count, 5);
        assert_eq!(dataset.metadata.feature_names.len(), FEATURE_NAMES.len());
    }

    #[test]
    fn risk_score_uses_bands_and_clamps() {
        let row = FeatureRow {
            age: 22.0,
            income: 10_000.0,
            monthly_expenses: 900.0,
            debt_amount: 50_000.0,
            credit_score: 550.0,
            savings_rate: 0.0,
            spending_category: 1.0,
            risk_tolerance: 1.0,
            financial_goals: 2.0,
        };
        assert_eq!(risk_score(&row), 1.0);

        let row = FeatureRow {
            age: 45.0,
            debt_amount: 0.0,
            credit_score: 650.0,
            ..row
        };
        assert!((risk_score(&row) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn zero_income_guards_ratios() {
        let row = FeatureRow {
            age: 30.0,
            income: 0.0,
            monthly_expenses: 500.0,
            debt_amount: 1_000.0,
            credit_score: 750.0,
            savings_rate: 0.0,
            spending_category: 1.0,
            risk_tolerance: 1.0,
            financial_goals: 2.0,
        };
        assert_eq!(spending_trend(&row), 0.0);
        assert_eq!(risk_score(&row), 0.0);
        assert_eq!(goal_achievement(&row), 1.0);
    }

    #[test]
    fn goal_achievement_is_partial_below_threshold() {
        // 60k income: threshold 1000/month, savings 5000 - 4500 = 500.
        let row = FeatureRow {
            age: 30.0,
            income: 60_000.0,
            monthly_expenses: 4_500.0,
            debt_amount: 0.0,
            credit_score: 750.0,
            savings_rate: 0.1,
            spending_category: 1.0,
            risk_tolerance: 1.0,
            financial_goals: 2.0,
        };
        assert!((goal_achievement(&row) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn split_partitions_without_overlap() {
        let dataset = process(&generate_records(100, 11).unwrap()).unwrap();
        let split = split(&dataset, 0.2, 3).unwrap();

        assert_eq!(split.test.len(), 20);
        assert_eq!(split.train.len(), 80);
        assert_eq!(split.train.target(Target::RiskScore).len(), 80);

        let train: HashSet<usize> = split.train.record_ids.iter().copied().collect();
        let test: HashSet<usize> = split.test.record_ids.iter().copied().collect();
        assert!(train.is_disjoint(&test));
        assert_eq!(train.len() + test.len(), 100);
    }

    #[test]
    fn split_keeps_feature_target_alignment() {
        let dataset = process(&seed_records()).unwrap();
        let split = split(&dataset, 0.4, 9).unwrap();
        for (row, id) in split.test.features.iter().zip(&split.test.record_ids) {
            assert_eq!(row, &dataset.features[*id]);
        }
        for (value, id) in split
            .train
            .target(Target::SavingsCapacity)
            .iter()
            .zip(&split.train.record_ids)
        {
            assert_eq!(*value, dataset.target(Target::SavingsCapacity)[*id]);
        }
    }

    #[test]
    fn split_rejects_bad_ratio() {
        let dataset = process(&seed_records()).unwrap();
        assert!(split(&dataset, 1.0, 0).is_err());
        assert!(split(&dataset, -0.1, 0).is_err());
    }

    #[test]
    fn empty_input_is_a_load_error() {
        assert!(matches!(process(&[]), Err(AppError::DatasetLoad(_))));
    }
}
