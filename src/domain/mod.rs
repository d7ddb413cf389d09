//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - model/algorithm tags (`ModelKind`, `Algorithm`)
//! - caller-supplied records (`Goal`, `UserProfile`, `Transaction`, `MarketConditions`)
//! - categorical encodings and the training `Dataset`
//! - run configuration (`TrainConfig`)

pub mod types;

pub use types::*;
