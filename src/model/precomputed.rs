//! Predictors that do not run a model in-process.

use std::fmt;
use std::path::Path;

use arrow::record_batch::RecordBatch;
use serde::Deserialize;

use crate::error::util::safe_read_to_string;
use crate::error::{Error, Result};
use crate::model::{Predictor, RawPrediction};
use crate::schema::ModelSchema;

/// Outputs scored out of process, replayed in row order
///
/// The JSON form is `{"columns": [...], "predictions": [...]}` where each
/// prediction is a class index or a label string.
#[derive(Debug, Clone)]
pub struct PrecomputedPredictor {
    schema: ModelSchema,
    predictions: Vec<RawPrediction>,
}

#[derive(Deserialize)]
struct PrecomputedFile {
    columns: Vec<String>,
    predictions: Vec<RawPrediction>,
}

impl PrecomputedPredictor {
    #[must_use]
    pub fn new(schema: ModelSchema, predictions: Vec<RawPrediction>) -> Self {
        Self {
            schema,
            predictions,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: PrecomputedFile = serde_json::from_str(json)?;
        Ok(Self::new(ModelSchema::new(file.columns)?, file.predictions))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = safe_read_to_string(path, "precomputed model output")?;
        Self::from_json(&json)
    }
}

impl Predictor for PrecomputedPredictor {
    fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    fn predict(&self, features: &RecordBatch) -> Result<Vec<RawPrediction>> {
        if features.num_rows() != self.predictions.len() {
            return Err(Error::PredictorFailure(format!(
                "{} precomputed predictions for {} feature rows",
                self.predictions.len(),
                features.num_rows()
            ))
            .into());
        }
        Ok(self.predictions.clone())
    }
}

/// A predictor backed by a closure, for in-process models
pub struct FnPredictor<F> {
    schema: ModelSchema,
    predict: F,
}

impl<F> FnPredictor<F>
where
    F: Fn(&RecordBatch) -> Result<Vec<RawPrediction>> + Send + Sync,
{
    pub fn new(schema: ModelSchema, predict: F) -> Self {
        Self { schema, predict }
    }
}

impl<F> fmt::Debug for FnPredictor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPredictor")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl<F> Predictor for FnPredictor<F>
where
    F: Fn(&RecordBatch) -> Result<Vec<RawPrediction>> + Send + Sync,
{
    fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    fn predict(&self, features: &RecordBatch) -> Result<Vec<RawPrediction>> {
        (self.predict)(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::arrow::batch_from_columns;

    fn empty_rows(n: usize) -> RecordBatch {
        batch_from_columns(Vec::new(), n).unwrap()
    }

    #[test]
    fn test_precomputed_from_json() {
        let predictor =
            PrecomputedPredictor::from_json(r#"{"columns": ["a", "b"], "predictions": [1, 0, "HOME"]}"#)
                .unwrap();
        assert_eq!(predictor.schema().columns(), ["a".to_string(), "b".to_string()]);
        assert_eq!(
            predictor.predict(&empty_rows(3)).unwrap(),
            vec![
                RawPrediction::Index(1),
                RawPrediction::Index(0),
                RawPrediction::Label("HOME".to_string())
            ]
        );
    }

    #[test]
    fn test_precomputed_row_count_mismatch() {
        let predictor = PrecomputedPredictor::new(ModelSchema::new(["a"]).unwrap(), vec![RawPrediction::Index(1)]);
        let err = predictor.predict(&empty_rows(2)).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::PredictorFailure(_))));
    }

    #[test]
    fn test_fn_predictor() {
        let predictor = FnPredictor::new(ModelSchema::new(["a"]).unwrap(), |batch: &RecordBatch| -> Result<Vec<RawPrediction>> {
            Ok(vec![RawPrediction::Index(2); batch.num_rows()])
        });
        assert_eq!(predictor.predict(&empty_rows(2)).unwrap().len(), 2);
    }
}
