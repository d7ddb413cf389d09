//! Held-out error metrics.

use serde::{Deserialize, Serialize};

use crate::math::r_squared;

/// Relative error within which a prediction counts as correct.
pub const ACCURACY_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub r_squared: f64,
    /// Share of predictions within [`ACCURACY_TOLERANCE`] relative error.
    pub accuracy: f64,
    pub mse: f64,
    pub mae: f64,
    pub n: usize,
}

/// Compare predictions with actual values.
///
/// An empty evaluation set yields all-zero metrics.
pub fn evaluate(actual: &[f64], predicted: &[f64]) -> ModelMetrics {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return ModelMetrics {
            r_squared: 0.0,
            accuracy: 0.0,
            mse: 0.0,
            mae: 0.0,
            n: 0,
        };
    }

    let actual = &actual[..n];
    let predicted = &predicted[..n];

    let mut sq = 0.0;
    let mut abs = 0.0;
    let mut correct = 0usize;
    for (a, p) in actual.iter().zip(predicted) {
        let err = p - a;
        sq += err * err;
        abs += err.abs();
        if within_tolerance(*a, *p) {
            correct += 1;
        }
    }

    let n_f = n as f64;
    ModelMetrics {
        r_squared: r_squared(actual, predicted),
        accuracy: correct as f64 / n_f,
        mse: sq / n_f,
        mae: abs / n_f,
        n,
    }
}

fn within_tolerance(actual: f64, predicted: f64) -> bool {
    (predicted - actual).abs() <= ACCURACY_TOLERANCE * actual.abs()
}
