//! Input data errors.
//!
//! A malformed record rejects the whole run: per-group statistics are only
//! meaningful over a coherent dataset.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("row {row}: missing required field '{field}'")]
    MissingField { row: usize, field: &'static str },

    #[error("row {row}: quantity '{value}' is not an integer")]
    InvalidQuantity { row: usize, value: String },

    #[error("row {row}: unit cost '{value}' must be a positive finite number")]
    InvalidUnitCost { row: usize, value: String },

    #[error("row {row}: date '{value}' is not YYYY-MM-DD")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: {reason}")]
    InvalidKind { row: usize, reason: String },

    #[error("row {row}: monetary impact exceeds the representable range")]
    ImpactOverflow { row: usize },

    #[error("total impact exceeds the representable range")]
    TotalImpactOverflow,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for dataset operations.
pub type DataResult<T> = Result<T, DataError>;
