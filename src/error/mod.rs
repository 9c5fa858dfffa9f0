//! Error handling for the outcome pipelines.
//!
//! Typed failures are variants of [`Error`]; they travel through the crate as
//! `anyhow::Error` so that I/O, Arrow and JSON failures can carry context.
//! Callers that need to react to a specific failure use
//! `err.downcast_ref::<Error>()`.

pub mod util;

use arrow::datatypes::DataType;

pub use util::ResultExt;

/// Specialized error type for the feature pipelines
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A record whose timestamps cannot be used for feature derivation
    #[error("Malformed record '{identifier}': column {column} has unusable value {value:?}")]
    MalformedRecord {
        /// Identifier of the failing record
        identifier: String,
        /// Column that failed to parse
        column: String,
        /// Raw value, `None` when the value was missing
        value: Option<String>,
    },

    /// A required column is not present in the batch
    #[error("Column '{column}' not found in record batch")]
    MissingColumn {
        /// Name of the missing column
        column: String,
    },

    /// A column kept for a model cannot be represented numerically
    #[error("Schema mismatch: column '{column}' has non-numeric type {data_type}")]
    SchemaMismatch {
        /// Offending column
        column: String,
        /// Type found in the feature table
        data_type: DataType,
    },

    /// A column could not be read as the expected Arrow type
    #[error("Column '{column}' could not be read as {expected}")]
    InvalidDataType {
        /// Column name
        column: String,
        /// Human-readable name of the expected type
        expected: String,
    },

    /// Two sequences that must be positionally aligned differ in length
    #[error("Length mismatch in {context}: expected {expected}, got {actual}")]
    LengthMismatch {
        /// What was being compared
        context: String,
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// The external predictor failed or produced unusable output
    #[error("Predictor failure: {0}")]
    PredictorFailure(String),

    /// The pipeline configuration is inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A file format the reader or writer does not handle
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

/// Result type used throughout the crate
pub type Result<T> = anyhow::Result<T>;

impl Error {
    /// Build a `MissingColumn` error
    #[must_use]
    pub fn missing_column(column: &str) -> Self {
        Self::MissingColumn {
            column: column.to_string(),
        }
    }

    /// Build a `LengthMismatch` error
    #[must_use]
    pub fn length_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::LengthMismatch {
            context: context.to_string(),
            expected,
            actual,
        }
    }
}

/// Find the typed [`Error`] behind an `anyhow::Error`, if there is one
#[must_use]
pub fn as_pipeline_error(error: &anyhow::Error) -> Option<&Error> {
    error.chain().find_map(|cause| cause.downcast_ref::<Error>())
}
