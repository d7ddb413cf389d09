//! Least squares solver.
//!
//! Polynomial fits reduce to the normal equations
//!
//! ```text
//! (XᵀX) β = Xᵀy
//! ```
//!
//! where `X` is the Vandermonde design matrix. The system is tiny (degree + 1
//! columns) but can be badly conditioned when `x` spans a wide range, so we
//! solve it with SVD and progressively looser singular-value tolerances.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Build the Vandermonde design matrix with the constant column first.
pub fn vandermonde(x: &[f64], degree: usize) -> DMatrix<f64> {
    DMatrix::from_fn(x.len(), degree + 1, |row, col| x[row].powi(col as i32))
}

/// Solve the normal equations for `y ≈ X β`.
pub fn solve_normal_equations(design: &DMatrix<f64>, y: &[f64]) -> Option<DVector<f64>> {
    let y = DVector::from_column_slice(y);
    let xt = design.transpose();
    let xtx = &xt * design;
    let xty = &xt * y;
    solve_least_squares(&xtx, &xty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn normal_equations_recover_quadratic() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| 1.0 - 2.0 * v + 0.5 * v * v).collect();
        let design = vandermonde(&x, 2);
        let beta = solve_normal_equations(&design, &y).unwrap();
        assert!((beta[0] - 1.0).abs() < 1e-8);
        assert!((beta[1] + 2.0).abs() < 1e-8);
        assert!((beta[2] - 0.5).abs() < 1e-8);
    }
}
