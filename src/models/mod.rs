//! Regression model representations.
//!
//! Models are plain data so that fitting/selection code can stay generic and
//! trained models can be exported as JSON.

pub mod model;

pub use model::*;
