//! Feature engineering and schema alignment for hospital outcome models:
//! ICU admission, discharge destination and length-of-stay bucket.

pub mod assemble;
pub mod config;
pub mod error;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod schema;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::{MalformedPolicy, PipelineConfig, Target};
pub use error::{Error, Result};
pub use schema::{AlignedFeatures, AlignmentReport, ModelSchema, SchemaAligner};

// Feature engineering
pub use features::{
    BuiltFeatures, ClinicalCategory, CollapseRule, Encoder, FeatureBuilder, classify, collapse,
};

// Models and results
pub use assemble::{PredictionEntry, PredictionResult, PredictionSet, assemble};
pub use model::{FnPredictor, LabelDecoder, PrecomputedPredictor, Predictor, RawPrediction};
pub use pipeline::{Pipeline, PreparedFeatures, prepare_features};

// Arrow types
pub use arrow::record_batch::RecordBatch;

// File I/O
pub use utils::io::{read_records, write_predictions, write_table};
