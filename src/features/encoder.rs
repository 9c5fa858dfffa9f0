//! Numeric encoding of intermediate feature tables.
//!
//! Encoding runs scale, label-encode, one-hot, base-N and impute in that
//! order. Each target enables its own subset through [`EncoderConfig`].
//! Scaling statistics are computed over the batch being encoded.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array};
use arrow::compute::kernels::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use log::debug;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::config::{BaseNSpec, EncoderConfig, LabelEncoding};
use crate::error::{Result, ResultExt};
use crate::schema::align::is_numeric;
use crate::utils::arrow::{
    batch_from_columns, downcast_array, float_values, named_columns, replace_with_columns,
    set_column, string_values,
};

/// Digits of one base-N code, most significant first
type Digits = SmallVec<[i64; 8]>;

/// Encodes feature tables for one target
#[derive(Debug, Clone)]
pub struct Encoder {
    config: EncoderConfig,
}

impl Encoder {
    #[must_use]
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encode an intermediate feature table
    ///
    /// # Errors
    /// Returns `MissingColumn` if a configured column is absent
    pub fn encode(&self, table: &RecordBatch) -> Result<RecordBatch> {
        let mut table = table.clone();

        for column in &self.config.scale {
            let scaled = standard_scale(&float_values(&table, column)?);
            table = set_column(&table, column, Arc::new(Float64Array::from(scaled)) as ArrayRef)?;
        }

        if let Some(encoding) = &self.config.label_encoding {
            table = label_encode(&table, encoding)?;
        }

        for column in &self.config.one_hot {
            table = one_hot(&table, column)?;
        }

        if let Some(spec) = &self.config.base_n {
            table = base_n(&table, spec)?;
        }

        if self.config.impute_mean {
            table = impute_mean(&table)?;
        }

        debug!(
            "Encoded {} rows into {} columns",
            table.num_rows(),
            table.num_columns()
        );
        Ok(table)
    }
}

/// Standardize values to zero mean and unit population variance
///
/// Nulls stay null and are left out of the statistics. A column without
/// spread is only centered.
#[must_use]
pub fn standard_scale(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return values.to_vec();
    }

    let n = present.len() as f64;
    let mean = present.iter().sum::<f64>() / n;
    let variance = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    let scale = if std.is_finite() && std > 0.0 { std } else { 1.0 };

    values
        .iter()
        .map(|value| value.map(|v| (v - mean) / scale))
        .collect()
}

/// Replace the target column by its index in a fixed vocabulary
pub fn label_encode(table: &RecordBatch, encoding: &LabelEncoding) -> Result<RecordBatch> {
    let codes: Vec<Option<i64>> = string_values(table, &encoding.column)?
        .iter()
        .map(|value| {
            value.as_deref().and_then(|v| {
                encoding
                    .vocabulary
                    .iter()
                    .position(|label| label == v)
                    .and_then(|i| i64::try_from(i).ok())
            })
        })
        .collect();
    set_column(
        table,
        &encoding.column,
        Arc::new(Int64Array::from(codes)) as ArrayRef,
    )
}

/// Expand a categorical column into `{column}_{value}` indicator columns
///
/// Indicators are appended in sorted value order; a null sets none of them.
pub fn one_hot(table: &RecordBatch, column: &str) -> Result<RecordBatch> {
    let values = string_values(table, column)?;
    let categories: Vec<&str> = values
        .iter()
        .flatten()
        .map(String::as_str)
        .unique()
        .sorted_unstable()
        .collect();

    let indicators = categories
        .iter()
        .map(|category| {
            let flags: Vec<i64> = values
                .iter()
                .map(|value| i64::from(value.as_deref() == Some(*category)))
                .collect();
            (
                format!("{column}_{category}"),
                Arc::new(Int64Array::from(flags)) as ArrayRef,
            )
        })
        .collect();

    replace_with_columns(table, column, indicators)
}

/// Number of base-`base` digit columns for `distinct` ordinals
///
/// `ceil(log_base(distinct)) + 1`, with at least one column.
#[must_use]
pub fn digit_count(distinct: usize, base: u32) -> usize {
    let target = distinct as u128;
    let base = u128::from(base.max(2));
    let mut power = 1u128;
    let mut digits = 1;
    while power < target {
        power *= base;
        digits += 1;
    }
    digits
}

/// Digits of `ordinal` in `base`, most significant first, padded to `width`
#[must_use]
pub fn to_digits(mut ordinal: u64, base: u32, width: usize) -> Digits {
    let base = u64::from(base.max(2));
    let mut digits: Digits = SmallVec::from_elem(0, width);
    for slot in digits.iter_mut().rev() {
        // Ordinals never exceed the batch size, so each digit fits in i64
        *slot = (ordinal % base) as i64;
        ordinal /= base;
    }
    digits
}

/// Replace a high-cardinality column by the base-N digits of its ordinal
///
/// Distinct values get ordinals `1..=n` by first appearance. A null present
/// in the batch is a value of its own and takes an ordinal too.
pub fn base_n(table: &RecordBatch, spec: &BaseNSpec) -> Result<RecordBatch> {
    let values = string_values(table, &spec.column)?;

    let mut ordinals: FxHashMap<Option<&str>, u64> = FxHashMap::default();
    for value in &values {
        let next = ordinals.len() as u64 + 1;
        ordinals.entry(value.as_deref()).or_insert(next);
    }

    let width = digit_count(ordinals.len(), spec.base);
    let encoded: Vec<Digits> = values
        .iter()
        .map(|value| {
            let ordinal = ordinals.get(&value.as_deref()).copied().unwrap_or(0);
            to_digits(ordinal, spec.base, width)
        })
        .collect();

    let columns = (0..width)
        .map(|position| {
            let digits: Vec<i64> = encoded.iter().map(|code| code[position]).collect();
            (
                format!("{}_{position}", spec.column),
                Arc::new(Int64Array::from(digits)) as ArrayRef,
            )
        })
        .collect();

    debug!(
        "Base-{} encoded {} distinct '{}' values into {width} columns",
        spec.base,
        ordinals.len(),
        spec.column
    );
    replace_with_columns(table, &spec.column, columns)
}

/// Fill nulls in every numeric column with the column mean
///
/// Numeric columns come out as `Float64`; an all-null column becomes zeros.
pub fn impute_mean(table: &RecordBatch) -> Result<RecordBatch> {
    let columns = named_columns(table)
        .into_iter()
        .map(|(name, array)| {
            if !is_numeric(array.data_type()) {
                return Ok((name, array));
            }
            let floats = cast::cast(&array, &DataType::Float64).with_column_context(&name)?;
            let floats = downcast_array::<Float64Array>(&floats, &name, "Float64")?;
            let present: Vec<f64> = floats.iter().flatten().collect();
            let mean = if present.is_empty() {
                0.0
            } else {
                present.iter().sum::<f64>() / present.len() as f64
            };
            let filled: Float64Array = floats.iter().map(|v| Some(v.unwrap_or(mean))).collect();
            Ok((name, Arc::new(filled) as ArrayRef))
        })
        .collect::<Result<Vec<_>>>()?;
    batch_from_columns(columns, table.num_rows())
}
