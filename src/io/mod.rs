//! Input/output helpers.
//!
//! - CSV ingest + cleaning for dataset records and transactions (`ingest`)
//! - trained-model JSON read/write (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
