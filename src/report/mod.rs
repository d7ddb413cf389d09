//! Terminal reports for training runs, forecasts, goals, and categorizations.

pub mod format;

pub use format::*;
