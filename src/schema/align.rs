//! Alignment of encoded feature tables to a model's training schema.
//!
//! Every schema column is taken from the table when present and otherwise
//! synthesized as zeros; table columns the schema does not list are dropped.
//! Zero filling is how categories absent from a batch reach the model, so it
//! cannot tell an absent category from one the model never saw. The report
//! makes that visible.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array};
use arrow::compute::kernels::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use log::{debug, info};

use crate::error::{Error, Result, ResultExt};
use crate::schema::ModelSchema;
use crate::utils::arrow::{batch_from_columns, named_columns};

/// What alignment had to change to fit a table to a schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignmentReport {
    /// Schema columns the table did not have, filled with zeros
    pub zero_filled: Vec<String>,
    /// Table columns the schema does not list
    pub dropped: Vec<String>,
}

impl AlignmentReport {
    /// Number of zero-filled columns
    #[must_use]
    pub fn zero_filled_count(&self) -> usize {
        self.zero_filled.len()
    }
}

/// An aligned feature table with its alignment report
#[derive(Debug, Clone)]
pub struct AlignedFeatures {
    /// Exactly the schema's columns, in schema order, all `Float64`
    pub table: RecordBatch,
    /// Columns filled or dropped during alignment
    pub report: AlignmentReport,
}

/// Reconciles feature tables with a model's ordered column list
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaAligner;

impl SchemaAligner {
    /// Align `table` to `schema`
    ///
    /// # Errors
    /// Returns `SchemaMismatch` if a column the schema keeps is not numeric
    pub fn align(table: &RecordBatch, schema: &ModelSchema) -> Result<AlignedFeatures> {
        let num_rows = table.num_rows();
        let available = named_columns(table);
        let mut report = AlignmentReport::default();
        let mut aligned: Vec<(String, ArrayRef)> = Vec::with_capacity(schema.len());

        for name in schema.columns() {
            let column = match available.iter().find(|(existing, _)| existing == name) {
                Some((_, array)) => to_float64(name, array)?,
                None => {
                    report.zero_filled.push(name.clone());
                    Arc::new(Float64Array::from(vec![0.0; num_rows])) as ArrayRef
                }
            };
            aligned.push((name.clone(), column));
        }

        report.dropped = available
            .into_iter()
            .map(|(name, _)| name)
            .filter(|name| !schema.contains(name))
            .collect();

        info!(
            "Aligned {num_rows} rows to {} model columns ({} zero-filled, {} dropped)",
            schema.len(),
            report.zero_filled.len(),
            report.dropped.len()
        );
        if !report.zero_filled.is_empty() {
            debug!("Zero-filled columns: {:?}", report.zero_filled);
        }
        if !report.dropped.is_empty() {
            debug!("Dropped columns: {:?}", report.dropped);
        }

        Ok(AlignedFeatures {
            table: batch_from_columns(aligned, num_rows)?,
            report,
        })
    }
}

/// Check if a data type can be handed to a model as a number
#[must_use]
pub fn is_numeric(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Null
            | DataType::Boolean
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float16
            | DataType::Float32
            | DataType::Float64
    )
}

fn to_float64(name: &str, array: &ArrayRef) -> Result<ArrayRef> {
    let data_type = array.data_type();
    if data_type == &DataType::Float64 {
        return Ok(array.clone());
    }
    if !is_numeric(data_type) {
        return Err(Error::SchemaMismatch {
            column: name.to_string(),
            data_type: data_type.clone(),
        }
        .into());
    }
    cast::cast(array, &DataType::Float64).with_column_context(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::arrow::{column_names, float_values};
    use arrow::array::{Int64Array, StringArray};

    fn table() -> RecordBatch {
        batch_from_columns(
            vec![
                ("b".to_string(), Arc::new(Int64Array::from(vec![1, 0])) as ArrayRef),
                ("a".to_string(), Arc::new(Float64Array::from(vec![0.5, -0.5])) as ArrayRef),
                ("extra".to_string(), Arc::new(Int64Array::from(vec![7, 7])) as ArrayRef),
            ],
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_align_reorders_fills_and_drops() {
        let schema = ModelSchema::new(["a", "missing", "b"]).unwrap();
        let aligned = SchemaAligner::align(&table(), &schema).unwrap();

        assert_eq!(column_names(&aligned.table), vec!["a", "missing", "b"]);
        assert_eq!(float_values(&aligned.table, "missing").unwrap(), vec![Some(0.0), Some(0.0)]);
        assert_eq!(float_values(&aligned.table, "b").unwrap(), vec![Some(1.0), Some(0.0)]);
        assert_eq!(aligned.report.zero_filled, vec!["missing"]);
        assert_eq!(aligned.report.dropped, vec!["extra"]);
        for field in aligned.table.schema().fields() {
            assert_eq!(field.data_type(), &DataType::Float64);
        }
    }

    #[test]
    fn test_align_rejects_text_columns() {
        let batch = batch_from_columns(
            vec![("GENDER".to_string(), Arc::new(StringArray::from(vec!["F"])) as ArrayRef)],
            1,
        )
        .unwrap();
        let schema = ModelSchema::new(["GENDER"]).unwrap();
        let err = SchemaAligner::align(&batch, &schema).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::SchemaMismatch { column, .. }) if column == "GENDER"
        ));
    }

    #[test]
    fn test_text_columns_outside_schema_are_dropped() {
        let batch = batch_from_columns(
            vec![("GENDER".to_string(), Arc::new(StringArray::from(vec!["F"])) as ArrayRef)],
            1,
        )
        .unwrap();
        let schema = ModelSchema::new(["GENDER_F"]).unwrap();
        let aligned = SchemaAligner::align(&batch, &schema).unwrap();
        assert_eq!(aligned.report.dropped, vec!["GENDER"]);
        assert_eq!(aligned.report.zero_filled_count(), 1);
    }

    #[test]
    fn test_align_empty_table() {
        let empty = batch_from_columns(Vec::new(), 0).unwrap();
        let schema = ModelSchema::new(["x", "y"]).unwrap();
        let aligned = SchemaAligner::align(&empty, &schema).unwrap();
        assert_eq!(aligned.table.num_rows(), 0);
        assert_eq!(column_names(&aligned.table), vec!["x", "y"]);
    }
}
