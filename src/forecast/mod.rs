//! Forward-looking analytics over caller-supplied history.
//!
//! - spending / income / savings-capacity trends (`trend`)
//! - goal probability, risks and recommendations (`goal`)

pub mod goal;
pub mod trend;

pub use goal::*;
pub use trend::*;
