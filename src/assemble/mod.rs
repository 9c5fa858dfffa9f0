//! Assembly of per-record predictions into a keyed result set.
//!
//! A [`PredictionSet`] maps record identifiers to the record's original label
//! and its predicted label. It serializes to the flat JSON object the result
//! server reads:
//!
//! ```json
//! {"42": {"Original_DISCHARGE_LOCATION": "HOME", "Predicted": "HOME"}}
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use arrow::datatypes::{DataType, Field, FieldRef};
use arrow::record_batch::RecordBatch;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::config::Target;
use crate::error::{Error, Result};
use crate::utils::logging::log_warning;

/// One record's outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(rename = "patient_id")]
    pub identifier: String,
    pub original: Option<String>,
    pub predicted: String,
}

/// Original and predicted label of one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionEntry {
    pub original: Option<String>,
    pub predicted: String,
}

/// Predictions for one target keyed by record identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionSet {
    target: Target,
    entries: BTreeMap<String, PredictionEntry>,
    overwritten: usize,
}

impl PredictionSet {
    #[must_use]
    pub fn new(target: Target) -> Self {
        Self {
            target,
            entries: BTreeMap::new(),
            overwritten: 0,
        }
    }

    #[must_use]
    pub fn target(&self) -> Target {
        self.target
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&PredictionEntry> {
        self.entries.get(identifier)
    }

    /// Number of entries replaced by a later record with the same identifier
    #[must_use]
    pub fn overwritten(&self) -> usize {
        self.overwritten
    }

    /// Insert an entry; an existing entry for the identifier is replaced
    pub fn insert(&mut self, identifier: String, entry: PredictionEntry) {
        if self.entries.insert(identifier, entry).is_some() {
            self.overwritten += 1;
        }
    }

    /// Entries as flat results, ordered by identifier
    #[must_use]
    pub fn results(&self) -> Vec<PredictionResult> {
        self.entries
            .iter()
            .map(|(identifier, entry)| PredictionResult {
                identifier: identifier.clone(),
                original: entry.original.clone(),
                predicted: entry.predicted.clone(),
            })
            .collect()
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Arrow fields of the flat result table
    #[must_use]
    pub fn fields() -> Vec<FieldRef> {
        vec![
            Arc::new(Field::new("patient_id", DataType::Utf8, false)),
            Arc::new(Field::new("original", DataType::Utf8, true)),
            Arc::new(Field::new("predicted", DataType::Utf8, false)),
        ]
    }

    /// Flatten into a record batch with `patient_id`, `original` and `predicted` columns
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        serde_arrow::to_record_batch(&Self::fields(), &self.results())
            .map_err(|e| anyhow::anyhow!("Serialization error: {}", e))
    }

    /// Rebuild a set from a flat result table
    pub fn from_record_batch(target: Target, batch: &RecordBatch) -> Result<Self> {
        let results: Vec<PredictionResult> = serde_arrow::from_record_batch(batch)
            .map_err(|e| anyhow::anyhow!("Failed to deserialize: {}", e))?;
        let mut set = Self::new(target);
        for result in results {
            set.insert(
                result.identifier,
                PredictionEntry {
                    original: result.original,
                    predicted: result.predicted,
                },
            );
        }
        Ok(set)
    }
}

impl Serialize for PredictionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let original_key = self.target.original_key();
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (identifier, entry) in &self.entries {
            map.serialize_entry(identifier, &SerializedEntry { original_key, entry })?;
        }
        map.end()
    }
}

struct SerializedEntry<'a> {
    original_key: &'static str,
    entry: &'a PredictionEntry,
}

impl Serialize for SerializedEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.original_key, &self.entry.original)?;
        map.serialize_entry("Predicted", &self.entry.predicted)?;
        map.end()
    }
}

/// Zip identifiers, original labels and predicted labels into a result set
///
/// Duplicate identifiers are last-write-wins; each overwrite is logged.
///
/// # Errors
/// Returns `LengthMismatch` if the three sequences differ in length
pub fn assemble(
    target: Target,
    identifiers: &[String],
    original_labels: &[Option<String>],
    predicted_labels: &[String],
) -> Result<PredictionSet> {
    if original_labels.len() != identifiers.len() {
        return Err(
            Error::length_mismatch("original labels", identifiers.len(), original_labels.len())
                .into(),
        );
    }
    if predicted_labels.len() != identifiers.len() {
        return Err(Error::length_mismatch(
            "predicted labels",
            identifiers.len(),
            predicted_labels.len(),
        )
        .into());
    }

    let mut set = PredictionSet::new(target);
    for ((identifier, original), predicted) in
        identifiers.iter().zip(original_labels).zip(predicted_labels)
    {
        if set.get(identifier).is_some() {
            log_warning("Duplicate identifier, keeping the later record", Some(identifier));
        }
        set.insert(
            identifier.clone(),
            PredictionEntry {
                original: original.clone(),
                predicted: predicted.clone(),
            },
        );
    }
    Ok(set)
}
