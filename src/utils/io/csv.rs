//! CSV tables

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::error::util::safe_open_file;
use crate::schema::columns::NUMERIC_COLUMNS;
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Schema from the header line: known numeric columns as `Float64`, the rest
/// as text so that codes keep their leading zeros
fn header_schema(path: &Path) -> Result<SchemaRef> {
    let file = safe_open_file(path, "CSV header")?;
    let (inferred, _) = Format::default()
        .with_header(true)
        .infer_schema(file, Some(0))
        .with_context(|| format!("Failed to read CSV header of {}", path.display()))?;

    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|field| {
            let data_type = if NUMERIC_COLUMNS.contains(&field.name().as_str()) {
                DataType::Float64
            } else {
                DataType::Utf8
            };
            Field::new(field.name(), data_type, true)
        })
        .collect();
    Ok(Arc::new(Schema::new(fields)))
}

/// Read a CSV file with a header row into one batch
pub fn read_csv(path: &Path) -> Result<RecordBatch> {
    let start = std::time::Instant::now();
    log_operation_start("Reading CSV file", &path.display().to_string());

    let schema = header_schema(path)?;
    let file = safe_open_file(path, "patient records")?;
    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .build(file)
        .with_context(|| format!("Failed to create CSV reader for {}", path.display()))?;
    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to parse CSV file {}", path.display()))?;
    let batch = concat_batches(&schema, &batches)?;

    log_operation_complete(
        "read",
        &path.display().to_string(),
        batch.num_rows(),
        Some(start.elapsed()),
    );
    Ok(batch)
}

/// Write a batch as CSV with a header row
pub fn write_csv(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file {}", path.display()))?;
    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer
        .write(batch)
        .with_context(|| format!("Failed to write CSV file {}", path.display()))?;
    log_operation_complete("wrote", &path.display().to_string(), batch.num_rows(), None);
    Ok(())
}
