//! DatasetPipeline: record processing, splitting, and built-in sample data.

pub mod pipeline;
pub mod sample;

pub use pipeline::*;
pub use sample::*;
