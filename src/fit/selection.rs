//! Model selection by goodness of fit, with a constant-mean fallback.
//!
//! Selection rules:
//! 1. Fit every requested algorithm; failures are recorded as skipped, never fatal.
//! 2. Choose the fit with the highest R²; ties go to the earlier candidate.
//! 3. If nothing could be fitted, fall back to predicting the mean of `y`.

use tracing::warn;

use crate::domain::Algorithm;
use crate::error::AppError;
use crate::fit::regression::{exponential_regression, linear_regression, polynomial_regression};
use crate::math::mean;
use crate::models::RegressionModel;

/// Output of fitting + selection.
#[derive(Debug, Clone)]
pub struct FitSelection {
    pub best: RegressionModel,
    /// Fits for all algorithms that succeeded, in candidate order.
    pub fits: Vec<(Algorithm, RegressionModel)>,
    /// Algorithms that failed and why (for diagnostics).
    pub skipped: Vec<(Algorithm, String)>,
}

impl FitSelection {
    /// True when no algorithm succeeded and `best` is the mean fallback.
    pub fn is_fallback(&self) -> bool {
        self.fits.is_empty()
    }
}

/// Fit a single algorithm.
pub fn fit_algorithm(algorithm: Algorithm, x: &[f64], y: &[f64]) -> Result<RegressionModel, AppError> {
    match algorithm {
        Algorithm::Linear => linear_regression(x, y),
        Algorithm::Polynomial { degree } => polynomial_regression(x, y, degree),
        Algorithm::Exponential => exponential_regression(x, y),
    }
}

/// Fit `algorithm`, substituting the constant-mean model on failure.
pub fn fit_or_mean(algorithm: Algorithm, x: &[f64], y: &[f64]) -> RegressionModel {
    match fit_algorithm(algorithm, x, y) {
        Ok(model) => model,
        Err(err) => {
            warn!(%algorithm, error = %err, "fit failed; using constant-mean fallback");
            mean_model(y)
        }
    }
}

/// The constant-mean fallback predictor.
pub fn mean_model(y: &[f64]) -> RegressionModel {
    RegressionModel::Mean { value: mean(y) }
}

/// Fit every candidate and select the best by R².
pub fn fit_and_select(x: &[f64], y: &[f64], algorithms: &[Algorithm]) -> FitSelection {
    let mut fits = Vec::new();
    let mut skipped = Vec::new();

    for &algorithm in algorithms {
        match fit_algorithm(algorithm, x, y) {
            Ok(model) => fits.push((algorithm, model)),
            Err(err) => {
                warn!(%algorithm, error = %err, "skipping algorithm");
                skipped.push((algorithm, err.to_string()));
            }
        }
    }

    let best = select_by_r_squared(&fits).unwrap_or_else(|| mean_model(y));

    FitSelection {
        best,
        fits,
        skipped,
    }
}

fn select_by_r_squared(fits: &[(Algorithm, RegressionModel)]) -> Option<RegressionModel> {
    let mut best: Option<&RegressionModel> = None;
    for (_, model) in fits {
        match best {
            Some(b) if model.r_squared() <= b.r_squared() => {}
            _ => best = Some(model),
        }
    }
    best.cloned()
}
