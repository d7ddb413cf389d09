//! One-dimensional regression fits.
//!
//! Every fit validates its input and returns `AppError::InvalidInput` when
//! there is not enough data. Callers that must not fail (trend analysis,
//! training) go through [`crate::fit::fit_or_mean`] instead.

use tracing::debug;

use crate::error::AppError;
use crate::math::{r_squared, solve_normal_equations, vandermonde};
use crate::models::{RegressionModel, predict_all};

/// Values below this are clamped before taking `ln` in the exponential fit.
pub const EXP_FLOOR: f64 = 0.001;

/// Ordinary least squares line through `(x, y)`.
pub fn linear_regression(x: &[f64], y: &[f64]) -> Result<RegressionModel, AppError> {
    validate_pairs(x, y, 2)?;

    let n = x.len() as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    let sum_xx: f64 = x.iter().map(|a| a * a).sum();

    let denom = n * sum_xx - sum_x * sum_x;
    if denom.abs() < 1e-12 {
        return Err(AppError::invalid_input(
            "Linear regression requires x values with non-zero variance.",
        ));
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;

    let fitted: Vec<f64> = x.iter().map(|xi| slope * xi + intercept).collect();
    let r_squared = r_squared(y, &fitted);

    debug!(slope, intercept, r_squared, n = x.len(), "linear fit");
    Ok(RegressionModel::Linear {
        slope,
        intercept,
        r_squared,
    })
}

/// Least squares polynomial of the given degree (normal equations).
pub fn polynomial_regression(
    x: &[f64],
    y: &[f64],
    degree: usize,
) -> Result<RegressionModel, AppError> {
    validate_pairs(x, y, degree + 1)?;

    let design = vandermonde(x, degree);
    let beta = solve_normal_equations(&design, y).ok_or_else(|| {
        AppError::Numeric(format!(
            "Polynomial regression (degree {degree}) normal equations are singular."
        ))
    })?;

    let coefficients: Vec<f64> = beta.iter().copied().collect();
    let partial = RegressionModel::Polynomial {
        coefficients: coefficients.clone(),
        r_squared: 0.0,
    };
    let r_squared = r_squared(y, &predict_all(&partial, x));

    debug!(degree, r_squared, n = x.len(), "polynomial fit");
    Ok(RegressionModel::Polynomial {
        coefficients,
        r_squared,
    })
}

/// `y = a·e^(b·x)` via a linear fit of `ln(y)`.
///
/// `y` is floored at [`EXP_FLOOR`] before the log. The reported R² is the
/// log-space value and is not recomputed against the original `y`.
pub fn exponential_regression(x: &[f64], y: &[f64]) -> Result<RegressionModel, AppError> {
    validate_pairs(x, y, 2)?;

    let ln_y: Vec<f64> = y.iter().map(|v| v.max(EXP_FLOOR).ln()).collect();
    let RegressionModel::Linear {
        slope,
        intercept,
        r_squared,
    } = linear_regression(x, &ln_y)?
    else {
        return Err(AppError::Numeric("Log-space fit did not return a line.".to_string()));
    };

    Ok(RegressionModel::Exponential {
        a: intercept.exp(),
        b: slope,
        r_squared,
    })
}

fn validate_pairs(x: &[f64], y: &[f64], min_len: usize) -> Result<(), AppError> {
    if x.len() != y.len() {
        return Err(AppError::invalid_input(format!(
            "x and y lengths differ ({} vs {}).",
            x.len(),
            y.len()
        )));
    }
    if x.len() < min_len {
        return Err(AppError::invalid_input(format!(
            "Need at least {min_len} points, got {}.",
            x.len()
        )));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(AppError::invalid_input("Non-finite value in regression input."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::predict;

    #[test]
    fn linear_recovers_exact_line() {
        let x: [f64; 5] = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v - 7.0).collect();
        let RegressionModel::Linear {
            slope,
            intercept,
            r_squared,
        } = linear_regression(&x, &y).unwrap()
        else {
            panic!("expected linear model");
        };
        assert!((slope - 3.0).abs() < 1e-10);
        assert!((intercept + 7.0).abs() < 1e-10);
        assert!((r_squared - 1.0).abs() < 1e-10);
    }

    #[test]
    fn linear_rejects_short_or_mismatched_input() {
        assert!(linear_regression(&[1.0], &[1.0]).unwrap_err().is_invalid_input());
        assert!(linear_regression(&[1.0, 2.0], &[1.0]).unwrap_err().is_invalid_input());
        assert!(linear_regression(&[1.0, 1.0], &[1.0, 2.0]).unwrap_err().is_invalid_input());
    }

    #[test]
    fn linear_flat_series_has_zero_r_squared() {
        let model = linear_regression(&[0.0, 1.0, 2.0], &[5.0, 5.0, 5.0]).unwrap();
        assert_eq!(model.r_squared(), 0.0);
        assert!((predict(&model, 10.0) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn polynomial_recovers_cubic() {
        let coeffs = [2.0, -1.0, 0.5, 0.25];
        let x: [f64; 6] = [-2.0, -1.0, 0.0, 1.0, 2.0, 3.0];
        let y: Vec<f64> = x
            .iter()
            .map(|v| coeffs.iter().enumerate().map(|(i, c)| c * v.powi(i as i32)).sum())
            .collect();
        let RegressionModel::Polynomial { coefficients, r_squared } =
            polynomial_regression(&x, &y, 3).unwrap()
        else {
            panic!("expected polynomial model");
        };
        assert_eq!(coefficients.len(), 4);
        for (got, want) in coefficients.iter().zip(coeffs) {
            assert!((got - want).abs() < 1e-6, "got {got}, want {want}");
        }
        assert!((r_squared - 1.0).abs() < 1e-9);
    }

    #[test]
    fn polynomial_requires_degree_plus_one_points() {
        let err = polynomial_regression(&[0.0, 1.0], &[1.0, 2.0], 2).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn exponential_recovers_parameters() {
        let x: [f64; 6] = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let y: Vec<f64> = x.iter().map(|v| 1500.0 * (0.05 * v).exp()).collect();
        let RegressionModel::Exponential { a, b, r_squared } =
            exponential_regression(&x, &y).unwrap()
        else {
            panic!("expected exponential model");
        };
        assert!((a - 1500.0).abs() < 1e-6);
        assert!((b - 0.05).abs() < 1e-10);
        assert!((r_squared - 1.0).abs() < 1e-10);
    }

    #[test]
    fn exponential_clamps_non_positive_values() {
        let model = exponential_regression(&[0.0, 1.0, 2.0], &[0.0, -5.0, 1.0]).unwrap();
        assert!(model.predict(1.0).is_finite());
    }
}
