//! Regression fitting.
//!
//! Responsibilities:
//!
//! - linear / polynomial / exponential fits with R² (`regression`)
//! - best-fit selection and the constant-mean fallback (`selection`)

pub mod regression;
pub mod selection;

pub use crate::math::moving_average;
pub use regression::*;
pub use selection::*;
