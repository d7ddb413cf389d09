//! Read/write trained-model JSON files.
//!
//! A model file is the portable form of a training run: each target's chosen
//! model (algorithm tag + parameters), its held-out metrics, and the candidate
//! comparison. Loading one rebuilds a [`ModelStore`] ready for prediction.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::train::{ModelStore, TrainedModel, TrainingReport};

const TOOL_NAME: &str = "finfc";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub tool: String,
    pub train_size: usize,
    pub test_size: usize,
    pub models: Vec<TrainedModel>,
}

impl ModelFile {
    pub fn from_report(report: &TrainingReport) -> Self {
        Self {
            tool: TOOL_NAME.to_string(),
            train_size: report.train_size,
            test_size: report.test_size,
            models: report.models.clone(),
        }
    }

    pub fn into_store(self) -> ModelStore {
        let mut store = ModelStore::new();
        for trained in self.models {
            store.insert(trained);
        }
        store
    }
}

/// Write a training report as pretty JSON.
pub fn write_models_json(path: &Path, report: &TrainingReport) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::Config(format!("Failed to create model JSON '{}': {e}", path.display()))
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), &ModelFile::from_report(report))?;
    Ok(())
}

/// Read a model JSON file written by [`write_models_json`].
pub fn read_models_json(path: &Path) -> Result<ModelFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::dataset_load(format!("Failed to open model JSON '{}': {e}", path.display()))
    })?;
    let models = serde_json::from_reader(BufReader::new(file))?;
    Ok(models)
}
