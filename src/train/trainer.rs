//! Per-target model training and the model store.
//!
//! For each target we:
//! - fit every candidate algorithm on the train split (in parallel)
//! - reject models with non-finite parameters or test predictions
//! - predict the test split and compute held-out metrics
//! - keep the candidate with the highest test R²
//!
//! Regression input is the first feature column only (`age`); the remaining
//! features are carried in the dataset but not used by these 1-D models.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{Algorithm, Dataset, DatasetSplit, Target};
use crate::error::AppError;
use crate::fit::{fit_algorithm, mean_model};
use crate::models::{RegressionModel, predict, predict_all};
use crate::train::metrics::{ModelMetrics, evaluate};

/// Held-out result for one candidate algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResult {
    pub algorithm: Algorithm,
    pub metrics: ModelMetrics,
}

/// The retained model for one target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub target: Target,
    /// `None` when every candidate failed and the mean fallback was kept.
    pub algorithm: Option<Algorithm>,
    pub model: RegressionModel,
    pub metrics: ModelMetrics,
    pub candidates: Vec<CandidateResult>,
    pub skipped: Vec<(Algorithm, String)>,
}

/// Train every algorithm for `target` and keep the best on the test split.
pub fn train_target_model(
    train: &Dataset,
    test: &Dataset,
    target: Target,
    algorithms: &[Algorithm],
) -> Result<TrainedModel, AppError> {
    let x_train = train.first_feature();
    let y_train = target_series(train, target)?;
    let x_test = test.first_feature();
    let y_test = target_series(test, target)?;

    // Trials are independent; collect keeps candidate order.
    let trials: Vec<(Algorithm, Result<(RegressionModel, ModelMetrics), AppError>)> = algorithms
        .par_iter()
        .map(|&algorithm| {
            let result = fit_algorithm(algorithm, &x_train, y_train).and_then(|model| {
                // An empty test split predicts nothing, so check the parameters too.
                if !model.is_finite() {
                    return Err(AppError::Numeric(format!(
                        "{algorithm} produced non-finite parameters."
                    )));
                }
                let predicted = predict_all(&model, &x_test);
                if predicted.iter().any(|v| !v.is_finite()) {
                    return Err(AppError::Numeric(format!(
                        "{algorithm} produced non-finite test predictions."
                    )));
                }
                let metrics = evaluate(y_test, &predicted);
                Ok((model, metrics))
            });
            (algorithm, result)
        })
        .collect();

    let mut candidates = Vec::new();
    let mut skipped = Vec::new();
    let mut best: Option<(Algorithm, RegressionModel, ModelMetrics)> = None;

    for (algorithm, result) in trials {
        match result {
            Ok((model, metrics)) => {
                candidates.push(CandidateResult {
                    algorithm,
                    metrics: metrics.clone(),
                });
                let better = match &best {
                    Some((_, _, top)) => metrics.r_squared > top.r_squared,
                    None => true,
                };
                if better {
                    best = Some((algorithm, model, metrics));
                }
            }
            Err(err) => {
                warn!(%target, %algorithm, error = %err, "skipping algorithm");
                skipped.push((algorithm, err.to_string()));
            }
        }
    }

    let (algorithm, model, metrics) = match best {
        Some((algorithm, model, metrics)) => (Some(algorithm), model, metrics),
        None => {
            warn!(%target, "no algorithm could be trained; using constant-mean fallback");
            let model = mean_model(y_train);
            if !model.is_finite() {
                return Err(AppError::Numeric(format!(
                    "Mean of `{target}` training values is not finite."
                )));
            }
            let metrics = evaluate(y_test, &predict_all(&model, &x_test));
            (None, model, metrics)
        }
    };

    info!(
        %target,
        model = model.kind().display_name(),
        r_squared = metrics.r_squared,
        accuracy = metrics.accuracy,
        "trained target model"
    );

    Ok(TrainedModel {
        target,
        algorithm,
        model,
        metrics,
        candidates,
        skipped,
    })
}

fn target_series(dataset: &Dataset, target: Target) -> Result<&[f64], AppError> {
    let series = dataset
        .targets
        .get(&target)
        .ok_or_else(|| AppError::invalid_input(format!("Dataset has no `{target}` target.")))?;
    if series.len() != dataset.features.len() {
        return Err(AppError::invalid_input(format!(
            "Target `{target}` has {} values for {} records.",
            series.len(),
            dataset.features.len()
        )));
    }
    Ok(series)
}

/// Trained models keyed by target.
///
/// Lifecycle: create → train → query → clear.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelStore {
    models: BTreeMap<Target, TrainedModel>,
}

impl ModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, trained: TrainedModel) -> Option<TrainedModel> {
        self.models.insert(trained.target, trained)
    }

    pub fn get(&self, target: Target) -> Option<&TrainedModel> {
        self.models.get(&target)
    }

    pub fn remove(&mut self, target: Target) -> Option<TrainedModel> {
        self.models.remove(&target)
    }

    /// Predict `target` for a first-feature value, if a model is stored.
    pub fn predict(&self, target: Target, x: f64) -> Option<f64> {
        self.get(target).map(|trained| predict(&trained.model, x))
    }

    pub fn clear(&mut self) {
        self.models.clear();
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrainedModel> {
        self.models.values()
    }
}

/// Summary of one training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub train_size: usize,
    pub test_size: usize,
    pub models: Vec<TrainedModel>,
}

/// Trains every target and keeps the results in its [`ModelStore`].
#[derive(Debug, Clone)]
pub struct ModelTrainer {
    algorithms: Vec<Algorithm>,
    store: ModelStore,
}

impl Default for ModelTrainer {
    fn default() -> Self {
        Self::new(Algorithm::DEFAULTS.to_vec())
    }
}

impl ModelTrainer {
    pub fn new(algorithms: Vec<Algorithm>) -> Self {
        Self {
            algorithms,
            store: ModelStore::new(),
        }
    }

    pub fn algorithms(&self) -> &[Algorithm] {
        &self.algorithms
    }

    /// Train all targets present in the split, replacing stored models.
    pub fn train(&mut self, split: &DatasetSplit) -> Result<TrainingReport, AppError> {
        if self.algorithms.is_empty() {
            return Err(AppError::invalid_input("No algorithms configured."));
        }

        let mut models = Vec::new();
        for target in Target::ALL {
            if !split.train.targets.contains_key(&target) {
                continue;
            }
            let trained = train_target_model(&split.train, &split.test, target, &self.algorithms)?;
            self.store.insert(trained.clone());
            models.push(trained);
        }

        Ok(TrainingReport {
            train_size: split.train.len(),
            test_size: split.test.len(),
            models,
        })
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    pub fn predict(&self, target: Target, x: f64) -> Option<f64> {
        self.store.predict(target, x)
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{process, seed_records, split};
    use crate::domain::ModelKind;

    fn seed_split() -> DatasetSplit {
        let dataset = process(&seed_records()).unwrap();
        split(&dataset, 0.4, 7).unwrap()
    }

    #[test]
    fn trains_every_target_and_stores_it() {
        let split = seed_split();
        let mut trainer = ModelTrainer::default();
        let report = trainer.train(&split).unwrap();

        assert_eq!(report.train_size, 3);
        assert_eq!(report.test_size, 2);
        assert_eq!(report.models.len(), Target::ALL.len());
        assert_eq!(trainer.store().len(), Target::ALL.len());
        assert!(trainer.predict(Target::RiskScore, 30.0).is_some());

        trainer.clear();
        assert!(trainer.store().is_empty());
        assert!(trainer.predict(Target::RiskScore, 30.0).is_none());
    }

    #[test]
    fn underdetermined_polynomial_is_skipped() {
        let split = seed_split();
        // Three train rows cannot support a degree-5 polynomial.
        let trained = train_target_model(
            &split.train,
            &split.test,
            Target::SavingsCapacity,
            &[Algorithm::Polynomial { degree: 5 }, Algorithm::Linear],
        )
        .unwrap();
        assert_eq!(trained.skipped.len(), 1);
        assert_eq!(trained.algorithm, Some(Algorithm::Linear));
        assert_eq!(trained.candidates.len(), 1);
    }

    #[test]
    fn all_failures_fall_back_to_mean() {
        let split = seed_split();
        let trained = train_target_model(
            &split.train,
            &split.test,
            Target::GoalAchievement,
            &[Algorithm::Polynomial { degree: 9 }],
        )
        .unwrap();
        assert!(trained.algorithm.is_none());
        assert_eq!(trained.model.kind(), ModelKind::Mean);
    }

    #[test]
    fn overflowing_parameters_are_skipped_without_test_rows() {
        let split = seed_split();
        let mut train = split.train.clone();
        // ln(y) falls steeply with age, so the exponential intercept overflows.
        for (row, age) in train.features.iter_mut().zip([100.0, 101.0, 102.0]) {
            row.age = age;
        }
        train
            .targets
            .insert(Target::SavingsCapacity, vec![1e300, 1e150, 0.001]);
        let mut test = split.test.clone();
        test.features.clear();
        test.record_ids.clear();
        for series in test.targets.values_mut() {
            series.clear();
        }

        let trained = train_target_model(
            &train,
            &test,
            Target::SavingsCapacity,
            &[Algorithm::Exponential, Algorithm::Linear],
        )
        .unwrap();
        assert!(trained.skipped.iter().any(|(a, _)| *a == Algorithm::Exponential));
        assert_ne!(trained.algorithm, Some(Algorithm::Exponential));
        assert!(trained.model.is_finite());
    }

    #[test]
    fn keeps_highest_test_r_squared() {
        let split = seed_split();
        let trained = train_target_model(
            &split.train,
            &split.test,
            Target::SpendingTrend,
            &Algorithm::DEFAULTS,
        )
        .unwrap();
        let best = trained
            .candidates
            .iter()
            .map(|c| c.metrics.r_squared)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(trained.metrics.r_squared, best);
    }
}
