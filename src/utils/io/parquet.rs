//! Parquet tables

use std::fs::File;
use std::path::Path;

use anyhow::Context;
use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::Result;
use crate::error::util::safe_open_file;
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Read a Parquet file into one batch
pub fn read_parquet(path: &Path) -> Result<RecordBatch> {
    let start = std::time::Instant::now();
    log_operation_start("Reading parquet file", &path.display().to_string());

    let file = safe_open_file(path, "patient records")?;
    let reader_builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| anyhow::anyhow!("Failed to read parquet file {}: {}", path.display(), e))?;
    let schema = reader_builder.schema().clone();
    let reader = reader_builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build parquet reader. Error: {}", e))?;

    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| anyhow::anyhow!("Failed to read record batch. Error: {}", e))?;
    let batch = concat_batches(&schema, &batches)?;

    log_operation_complete(
        "read",
        &path.display().to_string(),
        batch.num_rows(),
        Some(start.elapsed()),
    );
    Ok(batch)
}

/// Write a batch to a Parquet file
pub fn write_parquet(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create parquet file {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    log_operation_complete("wrote", &path.display().to_string(), batch.num_rows(), None);
    Ok(())
}
