//! File input and output
//!
//! Patient records and feature tables are read and written as CSV or Parquet;
//! prediction sets additionally as JSON. The format follows the file
//! extension.

pub mod csv;
pub mod parquet;

use std::fs;
use std::path::Path;

use anyhow::Context;
use arrow::record_batch::RecordBatch;

use crate::assemble::PredictionSet;
use crate::error::{Error, Result};

pub use self::csv::{read_csv, write_csv};
pub use self::parquet::{read_parquet, write_parquet};

/// A supported file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Parquet,
    Json,
}

impl FileFormat {
    /// Detect the format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("parquet" | "pq") => Ok(Self::Parquet),
            Some("json") => Ok(Self::Json),
            _ => Err(Error::UnsupportedFormat(path.display().to_string()).into()),
        }
    }
}

/// Read a file of patient records into one batch
pub fn read_records(path: &Path) -> Result<RecordBatch> {
    match FileFormat::from_path(path)? {
        FileFormat::Csv => read_csv(path),
        FileFormat::Parquet => read_parquet(path),
        FileFormat::Json => Err(Error::UnsupportedFormat(format!(
            "{} (records must be CSV or Parquet)",
            path.display()
        ))
        .into()),
    }
}

/// Write a table as CSV or Parquet
pub fn write_table(path: &Path, batch: &RecordBatch) -> Result<()> {
    match FileFormat::from_path(path)? {
        FileFormat::Csv => write_csv(path, batch),
        FileFormat::Parquet => write_parquet(path, batch),
        FileFormat::Json => Err(Error::UnsupportedFormat(format!(
            "{} (tables must be CSV or Parquet)",
            path.display()
        ))
        .into()),
    }
}

/// Write a prediction set as keyed JSON, or as a flat table
pub fn write_predictions(path: &Path, predictions: &PredictionSet) -> Result<()> {
    match FileFormat::from_path(path)? {
        FileFormat::Json => fs::write(path, predictions.to_json()?)
            .with_context(|| format!("Failed to write predictions to {}", path.display())),
        _ => write_table(path, &predictions.to_record_batch()?),
    }
}
