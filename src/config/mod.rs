//! Configuration for the outcome pipelines.
//!
//! The three prediction targets share one feature pipeline; a
//! [`PipelineConfig`] says which collapses, derived labels, scaled columns and
//! encodings apply to a target. Presets reproduce the trained models' feature
//! engineering and can be overridden from a JSON file.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::util::safe_read_to_string;
use crate::error::{Error, Result};
use crate::features::binning::BinSpec;
use crate::features::collapse::CollapseRule;
use crate::model::LabelDecoder;
use crate::schema::columns::{
    ADMISSION_LOCATION, ADMISSION_TYPE, DIAGNOSIS, DISCHARGE_LOCATION, ETHNICITY,
    FIRST_CAREUNIT, GENDER, ICD9_CATEGORY, INSURANCE, LAST_CAREUNIT, LOS, LOS_BINNED,
    LOS_IN_HOSPITAL, SEQ_NUM,
};

/// The outcome a pipeline predicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// ICU admission likelihood
    Admission,
    /// Discharge destination category
    Discharge,
    /// Length-of-stay bucket
    LengthOfStay,
}

impl Target {
    /// All targets, in the order results are usually reported
    pub const ALL: [Self; 3] = [Self::Admission, Self::Discharge, Self::LengthOfStay];

    /// Short name used on the command line and in logs
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Admission => "admission",
            Self::Discharge => "discharge",
            Self::LengthOfStay => "los",
        }
    }

    /// Key of the original label in serialized prediction sets
    #[must_use]
    pub const fn original_key(self) -> &'static str {
        match self {
            Self::Admission => "Original_ADMISSION_LOCATION",
            Self::Discharge => "Original_DISCHARGE_LOCATION",
            Self::LengthOfStay => "Original_LOS",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admission" => Ok(Self::Admission),
            "discharge" => Ok(Self::Discharge),
            "los" | "length_of_stay" | "length-of-stay" => Ok(Self::LengthOfStay),
            other => Err(format!(
                "unknown target '{other}' (expected admission, discharge or los)"
            )),
        }
    }
}

/// What to do with a record whose admission or discharge time is unusable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Abort the whole batch on the first malformed record
    #[default]
    FailBatch,
    /// Remove malformed records whole and process the rest
    DropRecord,
}

/// Accepted timestamp formats, tried in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateTimeFormatConfig {
    /// Formats carrying a time of day
    pub datetime_formats: Vec<String>,
    /// Date-only formats, resolved to midnight
    pub date_formats: Vec<String>,
}

impl Default for DateTimeFormatConfig {
    fn default() -> Self {
        Self {
            datetime_formats: vec![
                "%Y-%m-%d %H:%M:%S%.f".to_string(), // 2196-04-09 12:26:00
                "%Y-%m-%dT%H:%M:%S%.f".to_string(), // ISO 8601 without offset
                "%Y-%m-%d %H:%M".to_string(),
                "%d/%m/%Y %H:%M:%S".to_string(),
                "%d/%m/%Y %H:%M".to_string(),
                "%m/%d/%Y %H:%M".to_string(),
            ],
            date_formats: vec![
                "%Y-%m-%d".to_string(),
                "%d/%m/%Y".to_string(),
                "%Y%m%d".to_string(),
            ],
        }
    }
}

/// A collapse rule applied to one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCollapse {
    pub column: String,
    pub rule: CollapseRule,
}

impl ColumnCollapse {
    #[must_use]
    pub fn new(column: &str, rule: CollapseRule) -> Self {
        Self {
            column: column.to_string(),
            rule,
        }
    }
}

/// Where the ground-truth label of a target comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LabelSpec {
    /// The value of a column, after collapses
    Column { column: String },
    /// A bucket of a numeric column; the bucket is written to `column` and
    /// `source` is dropped
    Binned {
        source: String,
        column: String,
        bins: BinSpec,
    },
}

impl LabelSpec {
    /// Column holding the label once the feature table is built
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::Column { column } | Self::Binned { column, .. } => column,
        }
    }
}

/// Target-specific steps of feature building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Collapses applied before the label is captured
    #[serde(default)]
    pub collapse: Vec<ColumnCollapse>,
    /// Source of the original label
    pub label: LabelSpec,
    /// Columns dropped after the label is derived
    #[serde(default)]
    pub drop_columns: Vec<String>,
}

/// Label encoding of the target column against a fixed vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoding {
    pub column: String,
    pub vocabulary: Vec<String>,
}

/// Positional base-N encoding of a high-cardinality text column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseNSpec {
    pub column: String,
    pub base: u32,
}

/// Encoder parameters for one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Numeric columns standardized over the batch
    #[serde(default)]
    pub scale: Vec<String>,
    /// Target column encoded as vocabulary indices
    #[serde(default)]
    pub label_encoding: Option<LabelEncoding>,
    /// Categorical columns expanded to indicator columns, in order
    #[serde(default)]
    pub one_hot: Vec<String>,
    /// Base-N encoded diagnosis column
    #[serde(default)]
    pub base_n: Option<BaseNSpec>,
    /// Replace nulls in numeric columns with the column mean
    #[serde(default)]
    pub impute_mean: bool,
}

/// Complete configuration of one outcome pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub target: Target,
    pub features: FeatureConfig,
    pub encoder: EncoderConfig,
    pub decoder: LabelDecoder,
    #[serde(default)]
    pub date_formats: DateTimeFormatConfig,
    #[serde(default)]
    pub on_malformed: MalformedPolicy,
}

const DIAGNOSIS_BASE: u32 = 4;

fn names(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| (*c).to_string()).collect()
}

fn diagnosis_encoding() -> Option<BaseNSpec> {
    Some(BaseNSpec {
        column: DIAGNOSIS.to_string(),
        base: DIAGNOSIS_BASE,
    })
}

impl PipelineConfig {
    /// Preset for the given target
    #[must_use]
    pub fn for_target(target: Target) -> Self {
        match target {
            Target::Admission => Self::admission(),
            Target::Discharge => Self::discharge(),
            Target::LengthOfStay => Self::length_of_stay(),
        }
    }

    /// ICU admission: the raw admission location is the reported label
    #[must_use]
    pub fn admission() -> Self {
        Self {
            target: Target::Admission,
            features: FeatureConfig {
                collapse: Vec::new(),
                label: LabelSpec::Column {
                    column: ADMISSION_LOCATION.to_string(),
                },
                drop_columns: names(&[ADMISSION_TYPE]),
            },
            encoder: EncoderConfig {
                scale: names(&[LOS, SEQ_NUM, LOS_IN_HOSPITAL]),
                label_encoding: None,
                one_hot: names(&[
                    DISCHARGE_LOCATION,
                    INSURANCE,
                    GENDER,
                    FIRST_CAREUNIT,
                    LAST_CAREUNIT,
                    ICD9_CATEGORY,
                    ETHNICITY,
                    ADMISSION_LOCATION,
                ]),
                base_n: diagnosis_encoding(),
                impute_mean: false,
            },
            decoder: LabelDecoder::Binary {
                positive: "Admitted to ICU".to_string(),
                negative: "Not admitted to ICU".to_string(),
            },
            date_formats: DateTimeFormatConfig::default(),
            on_malformed: MalformedPolicy::default(),
        }
    }

    /// Discharge destination, predicted over the collapsed vocabulary
    #[must_use]
    pub fn discharge() -> Self {
        let vocabulary = CollapseRule::DischargeLocation.vocabulary();
        Self {
            target: Target::Discharge,
            features: FeatureConfig {
                collapse: vec![
                    ColumnCollapse::new(DISCHARGE_LOCATION, CollapseRule::DischargeLocation),
                    ColumnCollapse::new(ETHNICITY, CollapseRule::Ethnicity),
                ],
                label: LabelSpec::Column {
                    column: DISCHARGE_LOCATION.to_string(),
                },
                drop_columns: names(&[ADMISSION_TYPE, FIRST_CAREUNIT]),
            },
            encoder: EncoderConfig {
                scale: names(&[LOS, SEQ_NUM, LOS_IN_HOSPITAL]),
                label_encoding: Some(LabelEncoding {
                    column: DISCHARGE_LOCATION.to_string(),
                    vocabulary: vocabulary.clone(),
                }),
                one_hot: names(&[
                    INSURANCE,
                    GENDER,
                    LAST_CAREUNIT,
                    ICD9_CATEGORY,
                    ETHNICITY,
                    ADMISSION_LOCATION,
                ]),
                base_n: diagnosis_encoding(),
                impute_mean: true,
            },
            decoder: LabelDecoder::Vocabulary(vocabulary),
            date_formats: DateTimeFormatConfig::default(),
            on_malformed: MalformedPolicy::default(),
        }
    }

    /// Length-of-stay bucket of the ICU stay
    #[must_use]
    pub fn length_of_stay() -> Self {
        let bins = BinSpec::length_of_stay();
        let vocabulary = bins.labels.clone();
        Self {
            target: Target::LengthOfStay,
            features: FeatureConfig {
                collapse: vec![
                    ColumnCollapse::new(ETHNICITY, CollapseRule::Ethnicity),
                    ColumnCollapse::new(ADMISSION_LOCATION, CollapseRule::AdmissionLocation),
                ],
                label: LabelSpec::Binned {
                    source: LOS.to_string(),
                    column: LOS_BINNED.to_string(),
                    bins,
                },
                drop_columns: names(&[ADMISSION_TYPE]),
            },
            encoder: EncoderConfig {
                scale: names(&[SEQ_NUM, LOS_IN_HOSPITAL]),
                label_encoding: Some(LabelEncoding {
                    column: LOS_BINNED.to_string(),
                    vocabulary: vocabulary.clone(),
                }),
                one_hot: names(&[
                    DISCHARGE_LOCATION,
                    INSURANCE,
                    GENDER,
                    FIRST_CAREUNIT,
                    LAST_CAREUNIT,
                    ICD9_CATEGORY,
                    ETHNICITY,
                    ADMISSION_LOCATION,
                ]),
                base_n: diagnosis_encoding(),
                impute_mean: false,
            },
            decoder: LabelDecoder::Vocabulary(vocabulary),
            date_formats: DateTimeFormatConfig::default(),
            on_malformed: MalformedPolicy::default(),
        }
    }

    /// Set the malformed-record policy
    #[must_use]
    pub fn with_malformed_policy(mut self, policy: MalformedPolicy) -> Self {
        self.on_malformed = policy;
        self
    }

    /// Set the accepted timestamp formats
    #[must_use]
    pub fn with_date_formats(mut self, formats: DateTimeFormatConfig) -> Self {
        self.date_formats = formats;
        self
    }

    /// Parse and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a JSON file
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = safe_read_to_string(path, "pipeline configuration")?;
        Self::from_json(&json)
    }

    /// Check the configuration for internal consistency
    ///
    /// # Errors
    /// Returns `InvalidConfig` describing the first problem found
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(Error::InvalidConfig(msg).into()) };

        if let LabelSpec::Binned { bins, .. } = &self.features.label {
            bins.validate()?;
        }

        if let Some(base_n) = &self.encoder.base_n {
            if base_n.base < 2 {
                return invalid(format!(
                    "base-N encoding of '{}' needs a base of at least 2, got {}",
                    base_n.column, base_n.base
                ));
            }
        }

        if let Some(encoding) = &self.encoder.label_encoding {
            if encoding.vocabulary.is_empty() {
                return invalid(format!(
                    "label encoding of '{}' has an empty vocabulary",
                    encoding.column
                ));
            }
        }

        for name in &self.encoder.one_hot {
            if self.encoder.scale.contains(name) {
                return invalid(format!("column '{name}' is both scaled and one-hot encoded"));
            }
        }

        self.decoder.validate()
    }
}
