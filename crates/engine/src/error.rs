//! The module contains the errors the pipeline can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when a submission misses a required field.
//! - [`InvalidAmount`] thrown when an amount cannot be parsed.
//! - [`Csv`] and [`Io`] thrown while writing an export.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`Csv`]: EngineError::Csv
//!  [`Io`]: EngineError::Io
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::Csv(a), Self::Csv(b)) => a.to_string() == b.to_string(),
            (Self::Io(a), Self::Io(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
