//! Translation of raw model outputs into label text.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::RawPrediction;

/// How a target's model output becomes a label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelDecoder {
    /// Class 1 is `positive`; every other class is `negative`
    Binary { positive: String, negative: String },
    /// Class `i` is `labels[i]`; indices outside the vocabulary are clipped
    Vocabulary(Vec<String>),
}

impl LabelDecoder {
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Vocabulary(labels) if labels.is_empty() => Err(Error::InvalidConfig(
                "label decoder vocabulary is empty".to_string(),
            )
            .into()),
            _ => Ok(()),
        }
    }

    /// Decode one prediction; label text passes through unchanged
    #[must_use]
    pub fn decode(&self, prediction: &RawPrediction) -> String {
        let index = match prediction {
            RawPrediction::Label(label) => return label.clone(),
            RawPrediction::Index(index) => *index,
        };
        match self {
            Self::Binary { positive, negative } => {
                if index == 1 {
                    positive.clone()
                } else {
                    negative.clone()
                }
            }
            Self::Vocabulary(labels) => {
                let last = labels.len().saturating_sub(1);
                let clipped = usize::try_from(index.max(0)).map_or(last, |i| i.min(last));
                labels
                    .get(clipped)
                    .cloned()
                    .unwrap_or_else(|| index.to_string())
            }
        }
    }

    #[must_use]
    pub fn decode_all(&self, predictions: &[RawPrediction]) -> Vec<String> {
        predictions.iter().map(|p| self.decode(p)).collect()
    }
}
