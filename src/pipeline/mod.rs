//! End-to-end outcome pipeline for one target.
//!
//! raw records → [`FeatureBuilder`] → [`Encoder`] → [`SchemaAligner`] →
//! [`Predictor`] → [`LabelDecoder`](crate::model::LabelDecoder) → [`assemble`]

use std::time::Instant;

use anyhow::Context;
use arrow::record_batch::RecordBatch;

use crate::assemble::{PredictionSet, assemble};
use crate::config::{PipelineConfig, Target};
use crate::error::{Error, Result};
use crate::features::{Encoder, FeatureBuilder};
use crate::model::Predictor;
use crate::schema::{AlignedFeatures, ModelSchema, SchemaAligner};
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Features of a batch, ready to hand to a model
#[derive(Debug, Clone)]
pub struct PreparedFeatures {
    /// Identifiers of the records that made it through feature building
    pub identifiers: Vec<String>,
    /// Ground-truth label per record
    pub original_labels: Vec<Option<String>>,
    /// Identifiers of records dropped as malformed
    pub rejected: Vec<String>,
    /// Encoded table before alignment
    pub encoded: RecordBatch,
    /// Table aligned to the model schema
    pub aligned: AlignedFeatures,
}

/// Build, encode and align the features of a batch for one model schema
///
/// # Errors
/// Returns `InvalidConfig` before touching the batch if `config` is invalid
pub fn prepare_features(
    config: &PipelineConfig,
    batch: &RecordBatch,
    schema: &ModelSchema,
) -> Result<PreparedFeatures> {
    config.validate()?;
    let built = FeatureBuilder::from_pipeline(config)
        .build(batch)
        .with_context(|| format!("Failed to build {} features", config.target))?;
    let encoded = Encoder::new(config.encoder.clone())
        .encode(&built.table)
        .with_context(|| format!("Failed to encode {} features", config.target))?;
    let aligned = SchemaAligner::align(&encoded, schema)?;

    Ok(PreparedFeatures {
        identifiers: built.identifiers,
        original_labels: built.original_labels,
        rejected: built.rejected,
        encoded,
        aligned,
    })
}

/// A configured pipeline with its injected model
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    predictor: Box<dyn Predictor>,
}

impl Pipeline {
    /// Create a pipeline; the configuration is validated first
    pub fn new(config: PipelineConfig, predictor: Box<dyn Predictor>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, predictor })
    }

    #[must_use]
    pub fn target(&self) -> Target {
        self.config.target
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Features of a batch aligned to this pipeline's model
    pub fn features(&self, batch: &RecordBatch) -> Result<PreparedFeatures> {
        prepare_features(&self.config, batch, self.predictor.schema())
    }

    /// Predict the target for every record of a batch
    ///
    /// # Errors
    /// Any feature building error, a predictor failure, or `LengthMismatch`
    /// when the model returns the wrong number of predictions
    pub fn run(&self, batch: &RecordBatch) -> Result<PredictionSet> {
        let start = Instant::now();
        let target = self.target();
        log_operation_start("Predicting", target.name());

        let prepared = self.features(batch)?;
        let predictions = self
            .predictor
            .predict(&prepared.aligned.table)
            .map_err(|e| Error::PredictorFailure(format!("{target} model: {e:#}")))?;
        if predictions.len() != prepared.identifiers.len() {
            return Err(Error::length_mismatch(
                "model predictions",
                prepared.identifiers.len(),
                predictions.len(),
            )
            .into());
        }

        let predicted = self.config.decoder.decode_all(&predictions);
        let set = assemble(
            target,
            &prepared.identifiers,
            &prepared.original_labels,
            &predicted,
        )?;

        log_operation_complete("predicted", target.name(), set.len(), Some(start.elapsed()));
        Ok(set)
    }
}
