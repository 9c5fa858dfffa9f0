//! The boundary to trained models
//!
//! Models are external collaborators. The pipeline hands an aligned feature
//! table to a [`Predictor`] and decodes whatever comes back with a
//! [`LabelDecoder`].

pub mod decoder;
pub mod precomputed;

use std::fmt::Debug;

use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::ModelSchema;

pub use decoder::LabelDecoder;
pub use precomputed::{FnPredictor, PrecomputedPredictor};

/// One model output before decoding
///
/// Classifiers return a class index; some wrappers already return label text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPrediction {
    Index(i64),
    Label(String),
}

impl From<i64> for RawPrediction {
    fn from(index: i64) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for RawPrediction {
    fn from(label: &str) -> Self {
        Self::Label(label.to_string())
    }
}

/// A trained classifier for one target
///
/// Implementations are injected into the pipeline; nothing in the crate
/// loads a model globally.
pub trait Predictor: Debug + Send + Sync {
    /// The ordered columns the model was fit on
    fn schema(&self) -> &ModelSchema;

    /// Predict one output per row of an aligned feature table
    ///
    /// # Arguments
    ///
    /// * `features` - Feature table with exactly the columns of [`Predictor::schema`]
    ///
    /// # Returns
    ///
    /// * `Result<Vec<RawPrediction>>` - One prediction per input row, in row order
    fn predict(&self, features: &RecordBatch) -> Result<Vec<RawPrediction>>;
}
