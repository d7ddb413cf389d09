//! Model training over the processed dataset.

pub mod metrics;
pub mod trainer;

pub use metrics::*;
pub use trainer::*;
