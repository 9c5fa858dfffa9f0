//! Derivation of model features from raw patient records.
//!
//! Steps run in a fixed order because later steps consume columns that
//! earlier ones produce and drop:
//!
//! 1. capture identifiers and validate admission/discharge times
//! 2. drop administrative columns
//! 3. derive `DIED_IN_HOSPITAL`, drop `DOD_HOSP`
//! 4. derive `LOS_in_Hospital`, drop the consumed timestamps
//! 5. derive `ICD9_CATEGORY`, drop `ICD9_CODE`
//! 6. apply target collapses and capture the original label
//! 7. drop the target's extra columns

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Int64Array, StringArray};
use arrow::compute::filter_record_batch;
use arrow::record_batch::RecordBatch;
use log::debug;

use crate::config::{DateTimeFormatConfig, FeatureConfig, LabelSpec, MalformedPolicy, PipelineConfig};
use crate::error::{Error, Result};
use crate::features::codes::classify_all;
use crate::features::collapse::collapse_column;
use crate::schema::columns::{
    ADMINISTRATIVE_COLUMNS, ADMITTIME, CONSUMED_TIMESTAMPS, DIED_IN_HOSPITAL, DISCHTIME, DOD_HOSP,
    ICD9_CATEGORY, ICD9_CODE, LOS_IN_HOSPITAL, PATIENT_ID,
};
use crate::schema::dates::{parse_timestamp, whole_days_between};
use crate::utils::arrow::{drop_columns, float_values, set_column, string_values};
use crate::utils::logging::log_warning;

/// Output of feature building, positionally aligned by row
#[derive(Debug, Clone)]
pub struct BuiltFeatures {
    /// Record identifiers
    pub identifiers: Vec<String>,
    /// Ground-truth label of each record, if it has one
    pub original_labels: Vec<Option<String>>,
    /// Intermediate feature table, still holding categorical text columns
    pub table: RecordBatch,
    /// Identifiers of records removed under [`MalformedPolicy::DropRecord`]
    pub rejected: Vec<String>,
}

/// Builds intermediate feature tables for one target
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    config: FeatureConfig,
    date_formats: DateTimeFormatConfig,
    policy: MalformedPolicy,
}

impl FeatureBuilder {
    /// Create a builder from its parts
    #[must_use]
    pub fn new(
        config: FeatureConfig,
        date_formats: DateTimeFormatConfig,
        policy: MalformedPolicy,
    ) -> Self {
        Self {
            config,
            date_formats,
            policy,
        }
    }

    /// Create the builder configured by a pipeline configuration
    #[must_use]
    pub fn from_pipeline(config: &PipelineConfig) -> Self {
        Self::new(
            config.features.clone(),
            config.date_formats.clone(),
            config.on_malformed,
        )
    }

    /// Build the intermediate feature table from a batch of raw records
    ///
    /// # Errors
    /// - `MissingColumn` if a required raw column is absent
    /// - `MalformedRecord` for a missing identifier or an unusable admission
    ///   or discharge time under [`MalformedPolicy::FailBatch`]
    pub fn build(&self, batch: &RecordBatch) -> Result<BuiltFeatures> {
        let raw_ids = string_values(batch, PATIENT_ID)?;
        let identifiers: Vec<String> = raw_ids
            .iter()
            .enumerate()
            .map(|(row, id)| id.clone().unwrap_or_else(|| format!("row {row}")))
            .collect();
        let stays = self.stay_lengths(batch, &raw_ids, &identifiers)?;

        let (batch, identifiers, stays, rejected) = if stays.iter().all(Option::is_some) {
            (batch.clone(), identifiers, stays.into_iter().flatten().collect(), Vec::new())
        } else {
            let keep = BooleanArray::from(stays.iter().map(Option::is_some).collect::<Vec<_>>());
            let mut kept_ids = Vec::with_capacity(identifiers.len());
            let mut rejected = Vec::new();
            for (identifier, stay) in identifiers.into_iter().zip(&stays) {
                if stay.is_some() {
                    kept_ids.push(identifier);
                } else {
                    rejected.push(identifier);
                }
            }
            (
                filter_record_batch(batch, &keep)?,
                kept_ids,
                stays.into_iter().flatten().collect::<Vec<i64>>(),
                rejected,
            )
        };

        let table = drop_columns(&batch, &ADMINISTRATIVE_COLUMNS)?;
        let table = derive_died_in_hospital(&table)?;

        let table = set_column(
            &table,
            LOS_IN_HOSPITAL,
            Arc::new(Int64Array::from(stays)) as ArrayRef,
        )?;
        let table = drop_columns(&table, &CONSUMED_TIMESTAMPS)?;

        let table = derive_clinical_category(&table)?;

        let mut table = table;
        for collapse in &self.config.collapse {
            table = collapse_column(&table, &collapse.column, collapse.rule)?;
        }

        let (table, original_labels) = self.derive_label(&table)?;

        let extra: Vec<&str> = self.config.drop_columns.iter().map(String::as_str).collect();
        let table = drop_columns(&table, &extra)?;

        debug!(
            "Built {} feature columns for {} records ({} rejected)",
            table.num_columns(),
            table.num_rows(),
            rejected.len()
        );

        Ok(BuiltFeatures {
            identifiers,
            original_labels,
            table,
            rejected,
        })
    }

    /// Hospital stay in whole days per row; `None` marks a dropped record
    ///
    /// A row without an identifier is malformed; `identifiers` names it by
    /// row index.
    fn stay_lengths(
        &self,
        batch: &RecordBatch,
        raw_ids: &[Option<String>],
        identifiers: &[String],
    ) -> Result<Vec<Option<i64>>> {
        let admits = string_values(batch, ADMITTIME)?;
        let discharges = string_values(batch, DISCHTIME)?;

        let mut stays = Vec::with_capacity(identifiers.len());
        let rows = raw_ids.iter().zip(identifiers).zip(admits.iter().zip(&discharges));
        for ((raw_id, identifier), (admit, discharge)) in rows {
            let parsed = if raw_id.is_none() {
                Err(Error::MalformedRecord {
                    identifier: identifier.clone(),
                    column: PATIENT_ID.to_string(),
                    value: None,
                })
            } else {
                self.parse_required(identifier, ADMITTIME, admit.as_deref())
                    .and_then(|admit| {
                        self.parse_required(identifier, DISCHTIME, discharge.as_deref())
                            .map(|discharge| whole_days_between(admit, discharge))
                    })
            };
            match (parsed, self.policy) {
                (Ok(days), _) => stays.push(Some(days)),
                (Err(err), MalformedPolicy::FailBatch) => return Err(err.into()),
                (Err(err), MalformedPolicy::DropRecord) => {
                    log_warning(&format!("Dropping malformed record ({err})"), Some(identifier));
                    stays.push(None);
                }
            }
        }
        Ok(stays)
    }

    fn parse_required(
        &self,
        identifier: &str,
        column: &str,
        value: Option<&str>,
    ) -> std::result::Result<chrono::NaiveDateTime, Error> {
        value
            .and_then(|v| parse_timestamp(v, &self.date_formats))
            .ok_or_else(|| Error::MalformedRecord {
                identifier: identifier.to_string(),
                column: column.to_string(),
                value: value.map(str::to_string),
            })
    }

    fn derive_label(&self, table: &RecordBatch) -> Result<(RecordBatch, Vec<Option<String>>)> {
        match &self.config.label {
            LabelSpec::Column { column } => {
                let labels = string_values(table, column)?;
                Ok((table.clone(), labels))
            }
            LabelSpec::Binned {
                source,
                column,
                bins,
            } => {
                let labels: Vec<Option<String>> = float_values(table, source)?
                    .into_iter()
                    .map(|value| value.and_then(|v| bins.label(v)).map(str::to_string))
                    .collect();
                let binned = Arc::new(StringArray::from(labels.clone())) as ArrayRef;
                let table = set_column(table, column, binned)?;
                let table = drop_columns(&table, &[source.as_str()])?;
                Ok((table, labels))
            }
        }
    }
}

/// `DIED_IN_HOSPITAL` is 1 when a hospital death time is recorded
fn derive_died_in_hospital(table: &RecordBatch) -> Result<RecordBatch> {
    let died: Vec<i64> = string_values(table, DOD_HOSP)?
        .iter()
        .map(|value| i64::from(value.as_deref().is_some_and(|v| !v.trim().is_empty())))
        .collect();
    let table = set_column(table, DIED_IN_HOSPITAL, Arc::new(Int64Array::from(died)) as ArrayRef)?;
    drop_columns(&table, &[DOD_HOSP])
}

fn derive_clinical_category(table: &RecordBatch) -> Result<RecordBatch> {
    let categories: Vec<&str> = classify_all(&string_values(table, ICD9_CODE)?)
        .into_iter()
        .map(|category| category.as_str())
        .collect();
    let table = set_column(
        table,
        ICD9_CATEGORY,
        Arc::new(StringArray::from(categories)) as ArrayRef,
    )?;
    drop_columns(&table, &[ICD9_CODE])
}
