//! `fin-forecast` library crate.
//!
//! The binary (`finfc`) is a thin wrapper around this library so that the
//! forecasting, goal and training logic is testable without spawning
//! processes.
//!
//! - `fit` / `models`: regression fits and the data-only model type
//! - `forecast`: spending, income and savings trends; goal probability
//! - `data` / `io` / `train`: dataset pipeline and per-target model training
//! - `categorize`: keyword-based transaction categorization

pub mod app;
pub mod categorize;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod forecast;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
pub mod train;
