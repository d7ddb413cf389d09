//! The training workflow shared by `finfc train` and the integration tests:
//! load records -> process -> split -> train every target.

use tracing::info;

use crate::data::{generate_records, process, seed_records, split};
use crate::domain::{Dataset, DatasetSplit, RawRecord, TrainConfig};
use crate::error::AppError;
use crate::io::ingest::{DatasetSource, load};
use crate::train::{ModelTrainer, TrainingReport};

/// Everything one training run produced.
#[derive(Debug, Clone)]
pub struct TrainingRun {
    pub dataset: Dataset,
    pub split: DatasetSplit,
    pub trainer: ModelTrainer,
    pub report: TrainingReport,
}

/// Execute the full training pipeline for `config`.
pub fn run_training(config: &TrainConfig) -> Result<TrainingRun, AppError> {
    config.validate()?;

    let records = load_records(config)?;
    let dataset = process(&records)?;
    let split = split(&dataset, config.test_ratio, config.seed)?;

    let mut trainer = ModelTrainer::new(config.algorithms.clone());
    let report = trainer.train(&split)?;
    info!(targets = report.models.len(), "training complete");

    Ok(TrainingRun {
        dataset,
        split,
        trainer,
        report,
    })
}

fn load_records(config: &TrainConfig) -> Result<Vec<RawRecord>, AppError> {
    match &config.dataset {
        Some(path) => Ok(load(&DatasetSource::Path(path.clone()))?.records),
        None if config.sample_count == 0 => Ok(seed_records()),
        None => generate_records(config.sample_count, config.seed),
    }
}
