//! Utilities for working with Arrow arrays.
//!
//! Feature tables are plain `RecordBatch`es and every column is addressed by
//! name. These helpers read typed values out of named columns and rebuild
//! batches after columns are dropped, replaced or appended.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::compute::kernels::cast;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use log::debug;

use crate::error::{Error, Result, ResultExt};

/// Get a column from a record batch, cast to the expected data type
///
/// # Arguments
///
/// * `batch` - The record batch containing the column
/// * `column_name` - The name of the column to extract
/// * `expected_type` - The expected data type for the column
/// * `required` - Whether the column is required (error if missing) or optional (None if missing)
///
/// # Returns
///
/// * `Ok(Some(ArrayRef))` - The column array (converted if necessary) if found
/// * `Ok(None)` - If the column is not found and `required` is false
/// * `Err` - If the column is not found and `required` is true, or if the cast fails
pub fn get_column(
    batch: &RecordBatch,
    column_name: &str,
    expected_type: &DataType,
    required: bool,
) -> Result<Option<ArrayRef>> {
    let Ok(idx) = batch.schema().index_of(column_name) else {
        if required {
            return Err(Error::missing_column(column_name).into());
        }
        debug!("Column '{column_name}' not found in record batch");
        return Ok(None);
    };

    let column = batch.column(idx);
    if column.data_type() == expected_type {
        return Ok(Some(column.clone()));
    }

    debug!(
        "Converting column '{column_name}' from {:?} to {expected_type:?}",
        column.data_type()
    );
    let converted = cast::cast(column, expected_type).with_column_context(column_name)?;
    Ok(Some(converted))
}

/// Downcast a column to a specific array type with clear error messages
pub fn downcast_array<'a, A: Array + 'static>(
    array: &'a ArrayRef,
    column_name: &str,
    expected_type_name: &str,
) -> Result<&'a A> {
    array.as_any().downcast_ref::<A>().ok_or_else(|| {
        Error::InvalidDataType {
            column: column_name.to_string(),
            expected: expected_type_name.to_string(),
        }
        .into()
    })
}

/// Read a required column as optional strings
pub fn string_values(batch: &RecordBatch, column_name: &str) -> Result<Vec<Option<String>>> {
    let array = required_column(batch, column_name, &DataType::Utf8)?;
    let strings = downcast_array::<StringArray>(&array, column_name, "String")?;
    Ok(strings
        .iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Read a required column as optional floats
///
/// Values that cannot be cast become `None`.
pub fn float_values(batch: &RecordBatch, column_name: &str) -> Result<Vec<Option<f64>>> {
    let array = required_column(batch, column_name, &DataType::Float64)?;
    let floats = downcast_array::<Float64Array>(&array, column_name, "Float64")?;
    Ok(floats.iter().collect())
}

fn required_column(
    batch: &RecordBatch,
    column_name: &str,
    expected_type: &DataType,
) -> Result<ArrayRef> {
    get_column(batch, column_name, expected_type, true)?
        .ok_or_else(|| Error::missing_column(column_name).into())
}

/// Whether the batch has a column with this name
#[must_use]
pub fn has_column(batch: &RecordBatch, column_name: &str) -> bool {
    batch.schema().index_of(column_name).is_ok()
}

/// Column names of a batch, in order
#[must_use]
pub fn column_names(batch: &RecordBatch) -> Vec<String> {
    batch
        .schema()
        .fields()
        .iter()
        .map(|field| field.name().clone())
        .collect()
}

/// Build a batch from named columns, keeping the row count even with no columns
pub fn batch_from_columns(columns: Vec<(String, ArrayRef)>, num_rows: usize) -> Result<RecordBatch> {
    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, array)| Field::new(name, array.data_type().clone(), true))
        .collect();
    let arrays: Vec<ArrayRef> = columns.into_iter().map(|(_, array)| array).collect();
    let schema: SchemaRef = Arc::new(Schema::new(fields));
    let options = RecordBatchOptions::new().with_row_count(Some(num_rows));
    Ok(RecordBatch::try_new_with_options(schema, arrays, &options)?)
}

/// Split a batch into its named columns
#[must_use]
pub fn named_columns(batch: &RecordBatch) -> Vec<(String, ArrayRef)> {
    batch
        .schema()
        .fields()
        .iter()
        .zip(batch.columns())
        .map(|(field, array)| (field.name().clone(), array.clone()))
        .collect()
}

/// Drop the named columns; names not present are ignored
pub fn drop_columns(batch: &RecordBatch, names: &[&str]) -> Result<RecordBatch> {
    let kept = named_columns(batch)
        .into_iter()
        .filter(|(name, _)| !names.contains(&name.as_str()))
        .collect();
    batch_from_columns(kept, batch.num_rows())
}

/// Replace a column in place, or append it when the batch does not have it
pub fn set_column(batch: &RecordBatch, column_name: &str, array: ArrayRef) -> Result<RecordBatch> {
    if array.len() != batch.num_rows() {
        return Err(Error::length_mismatch(
            &format!("column '{column_name}'"),
            batch.num_rows(),
            array.len(),
        )
        .into());
    }

    let mut columns = named_columns(batch);
    match columns.iter_mut().find(|(name, _)| name == column_name) {
        Some(slot) => slot.1 = array,
        None => columns.push((column_name.to_string(), array)),
    }
    batch_from_columns(columns, batch.num_rows())
}

/// Remove one column and append replacement columns at the end of the batch
pub fn replace_with_columns(
    batch: &RecordBatch,
    column_name: &str,
    replacements: Vec<(String, ArrayRef)>,
) -> Result<RecordBatch> {
    let mut columns: Vec<(String, ArrayRef)> = named_columns(batch)
        .into_iter()
        .filter(|(name, _)| name != column_name)
        .collect();
    for (name, array) in replacements {
        if array.len() != batch.num_rows() {
            return Err(
                Error::length_mismatch(&format!("column '{name}'"), batch.num_rows(), array.len())
                    .into(),
            );
        }
        columns.retain(|(existing, _)| existing != &name);
        columns.push((name, array));
    }
    batch_from_columns(columns, batch.num_rows())
}
