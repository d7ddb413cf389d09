//! Crate error type.
//!
//! Every variant maps to a process exit code so the `finfc` binary can report
//! failures the same way regardless of which stage produced them:
//!
//! - `2`: invalid input or configuration
//! - `3`: dataset could not be loaded / not enough data
//! - `4`: internal numeric failure

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Dataset load error: {0}")]
    DatasetLoad(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Numeric error: {0}")]
    Numeric(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        AppError::InvalidInput(message.into())
    }

    pub fn dataset_load(message: impl Into<String>) -> Self {
        AppError::DatasetLoad(message.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::InvalidInput(_) | AppError::Config(_) | AppError::Json(_) => 2,
            AppError::DatasetLoad(_) | AppError::Io(_) | AppError::Csv(_) => 3,
            AppError::Numeric(_) => 4,
        }
    }

    /// True for the recoverable "not enough data to fit" tier.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, AppError::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_tiers() {
        assert_eq!(AppError::invalid_input("x").exit_code(), 2);
        assert_eq!(AppError::dataset_load("x").exit_code(), 3);
        assert_eq!(AppError::Numeric("x".into()).exit_code(), 4);
    }

    #[test]
    fn display_includes_message() {
        let err = AppError::invalid_input("need at least 2 points");
        assert_eq!(err.to_string(), "Invalid input: need at least 2 points");
    }
}
