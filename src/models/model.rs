//! Fitted regression models.
//!
//! A model carries only data (parameters + goodness of fit). Evaluation goes
//! through the stateless [`predict`] function, which dispatches on the variant.

use serde::{Deserialize, Serialize};

use crate::domain::ModelKind;

/// A fitted one-dimensional regression model. Immutable once fitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RegressionModel {
    /// `y = slope·x + intercept`
    Linear {
        slope: f64,
        intercept: f64,
        r_squared: f64,
    },
    /// `y = Σ coefficients[i]·x^i` (constant term first).
    Polynomial {
        coefficients: Vec<f64>,
        r_squared: f64,
    },
    /// `y = a·e^(b·x)`; `r_squared` is the log-space fit.
    Exponential { a: f64, b: f64, r_squared: f64 },
    /// Constant-mean fallback.
    Mean { value: f64 },
}

impl RegressionModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            RegressionModel::Linear { .. } => ModelKind::Linear,
            RegressionModel::Polynomial { .. } => ModelKind::Polynomial,
            RegressionModel::Exponential { .. } => ModelKind::Exponential,
            RegressionModel::Mean { .. } => ModelKind::Mean,
        }
    }

    pub fn r_squared(&self) -> f64 {
        match self {
            RegressionModel::Linear { r_squared, .. }
            | RegressionModel::Polynomial { r_squared, .. }
            | RegressionModel::Exponential { r_squared, .. } => *r_squared,
            RegressionModel::Mean { .. } => 0.0,
        }
    }

    /// Per-period slope where the model has one (linear slope, exponential
    /// rate, first-order polynomial term); zero for the mean fallback.
    pub fn slope(&self) -> f64 {
        match self {
            RegressionModel::Linear { slope, .. } => *slope,
            RegressionModel::Polynomial { coefficients, .. } => {
                coefficients.get(1).copied().unwrap_or(0.0)
            }
            RegressionModel::Exponential { b, .. } => *b,
            RegressionModel::Mean { .. } => 0.0,
        }
    }

    pub fn predict(&self, x: f64) -> f64 {
        predict(self, x)
    }

    /// True when every parameter and the fit statistic are finite, i.e. the
    /// model survives a JSON round trip.
    pub fn is_finite(&self) -> bool {
        match self {
            RegressionModel::Linear {
                slope,
                intercept,
                r_squared,
            } => slope.is_finite() && intercept.is_finite() && r_squared.is_finite(),
            RegressionModel::Polynomial {
                coefficients,
                r_squared,
            } => coefficients.iter().all(|c| c.is_finite()) && r_squared.is_finite(),
            RegressionModel::Exponential { a, b, r_squared } => {
                a.is_finite() && b.is_finite() && r_squared.is_finite()
            }
            RegressionModel::Mean { value } => value.is_finite(),
        }
    }
}

/// Evaluate `model` at `x`.
pub fn predict(model: &RegressionModel, x: f64) -> f64 {
    match model {
        RegressionModel::Linear {
            slope, intercept, ..
        } => slope * x + intercept,
        RegressionModel::Polynomial { coefficients, .. } => {
            // Horner's scheme, highest order first.
            coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
        }
        RegressionModel::Exponential { a, b, .. } => a * (b * x).exp(),
        RegressionModel::Mean { value } => *value,
    }
}

/// Evaluate `model` at every point of `xs`.
pub fn predict_all(model: &RegressionModel, xs: &[f64]) -> Vec<f64> {
    xs.iter().map(|&x| predict(model, x)).collect()
}
