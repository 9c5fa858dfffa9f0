//! Collapsing of high-cardinality categorical columns to small vocabularies.

use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::record_batch::RecordBatch;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::columns::{ADMISSION_LOCATION, DISCHARGE_LOCATION, ETHNICITY};
use crate::utils::arrow::{set_column, string_values};

pub const WHITE: &str = "WHITE";
pub const NON_WHITE: &str = "NON-WHITE";
pub const EMERGENCY_ROOM_ADMIT: &str = "EMERGENCY ROOM ADMIT";
pub const NO_EMERGENCY_ROOM_ADMIT: &str = "NO EMERGENCY ROOM ADMIT";
pub const HOME: &str = "HOME";
pub const REHAB: &str = "REHAB";
pub const LONG_TERM_CARE_FACILITY: &str = "LONG TERM CARE FACILITY";
pub const OTHERS: &str = "OTHERS";

/// A total mapping from raw column values to a fixed vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollapseRule {
    /// `WHITE` or `NON-WHITE`
    Ethnicity,
    /// `EMERGENCY ROOM ADMIT` or `NO EMERGENCY ROOM ADMIT`
    AdmissionLocation,
    /// `HOME`, `REHAB`, `LONG TERM CARE FACILITY` or `OTHERS`
    DischargeLocation,
}

impl CollapseRule {
    /// The rule conventionally applied to a raw column
    #[must_use]
    pub fn for_column(column: &str) -> Option<Self> {
        match column {
            ETHNICITY => Some(Self::Ethnicity),
            ADMISSION_LOCATION => Some(Self::AdmissionLocation),
            DISCHARGE_LOCATION => Some(Self::DischargeLocation),
            _ => None,
        }
    }

    /// Collapse one value; a missing value takes the fallback
    #[must_use]
    pub fn collapse(self, value: Option<&str>) -> &'static str {
        match self {
            Self::Ethnicity => match value {
                Some(WHITE) => WHITE,
                _ => NON_WHITE,
            },
            Self::AdmissionLocation => match value {
                Some(EMERGENCY_ROOM_ADMIT) => EMERGENCY_ROOM_ADMIT,
                _ => NO_EMERGENCY_ROOM_ADMIT,
            },
            Self::DischargeLocation => match value {
                Some("HOME" | "HOME HEALTH CARE") => HOME,
                Some("REHAB/DISTINCT PART HOSP") => REHAB,
                Some("LONG TERM CARE HOSPITAL") => LONG_TERM_CARE_FACILITY,
                _ => OTHERS,
            },
        }
    }

    /// Every value the rule can produce, sorted
    #[must_use]
    pub fn vocabulary(self) -> Vec<String> {
        let mut values = match self {
            Self::Ethnicity => vec![WHITE, NON_WHITE],
            Self::AdmissionLocation => vec![EMERGENCY_ROOM_ADMIT, NO_EMERGENCY_ROOM_ADMIT],
            Self::DischargeLocation => vec![HOME, REHAB, LONG_TERM_CARE_FACILITY, OTHERS],
        };
        values.sort_unstable();
        values.into_iter().map(str::to_string).collect()
    }
}

/// Collapse a named value with the rule registered for its column
///
/// Columns without a rule pass through unchanged.
#[must_use]
pub fn collapse(column_name: &str, value: &str) -> String {
    match CollapseRule::for_column(column_name) {
        Some(rule) => rule.collapse(Some(value)).to_string(),
        None => value.to_string(),
    }
}

/// Rewrite a column of a batch through a collapse rule
pub fn collapse_column(batch: &RecordBatch, column: &str, rule: CollapseRule) -> Result<RecordBatch> {
    let values = string_values(batch, column)?;
    let collapsed: Vec<&str> = values
        .par_iter()
        .map(|value| rule.collapse(value.as_deref()))
        .collect();
    set_column(batch, column, Arc::new(StringArray::from(collapsed)) as ArrayRef)
}
