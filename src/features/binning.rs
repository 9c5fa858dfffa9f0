//! Length-of-stay bucketing.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Right-inclusive bins over a numeric value
///
/// `edges[i]` is the exclusive lower edge of bucket `i`; bucket `i` ends at
/// `edges[i + 1]` inclusive and the last bucket is unbounded. Values at or
/// below `edges[0]` have no bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinSpec {
    pub edges: Vec<f64>,
    pub labels: Vec<String>,
}

impl BinSpec {
    /// ICU stay buckets in days: `(0,1] (1,5] (5,10] (10,20] (20,50] (50,∞)`
    #[must_use]
    pub fn length_of_stay() -> Self {
        Self {
            edges: vec![0.0, 1.0, 5.0, 10.0, 20.0, 50.0],
            labels: ["0-1", "1-5", "5-10", "10-20", "20-50", "50+"]
                .iter()
                .map(|l| (*l).to_string())
                .collect(),
        }
    }

    /// Check that edges are finite, strictly increasing and one per label
    pub fn validate(&self) -> Result<()> {
        if self.edges.is_empty() || self.edges.len() != self.labels.len() {
            return Err(Error::InvalidConfig(format!(
                "bin spec needs one edge per label, got {} edges and {} labels",
                self.edges.len(),
                self.labels.len()
            ))
            .into());
        }
        if self.edges.iter().any(|edge| !edge.is_finite())
            || self.edges.windows(2).any(|pair| pair[0] >= pair[1])
        {
            return Err(Error::InvalidConfig(format!(
                "bin edges must be finite and strictly increasing: {:?}",
                self.edges
            ))
            .into());
        }
        Ok(())
    }

    /// Index of the bucket containing `value`
    #[must_use]
    pub fn bucket(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        let first = *self.edges.first()?;
        if value <= first {
            return None;
        }
        // First upper edge at or above the value; past the last edge is the open bucket
        let upper = self.edges[1..].iter().position(|&edge| value <= edge);
        Some(upper.unwrap_or(self.edges.len() - 1))
    }

    /// Label of the bucket containing `value`
    #[must_use]
    pub fn label(&self, value: f64) -> Option<&str> {
        self.bucket(value)
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_of_stay_buckets() {
        let bins = BinSpec::length_of_stay();
        bins.validate().unwrap();
        assert_eq!(bins.label(0.5), Some("0-1"));
        assert_eq!(bins.label(1.0), Some("0-1"));
        assert_eq!(bins.label(1.0001), Some("1-5"));
        assert_eq!(bins.label(5.0), Some("1-5"));
        assert_eq!(bins.label(7.3), Some("5-10"));
        assert_eq!(bins.label(10.0), Some("5-10"));
        assert_eq!(bins.label(20.0), Some("10-20"));
        assert_eq!(bins.label(50.0), Some("20-50"));
        assert_eq!(bins.label(50.5), Some("50+"));
        assert_eq!(bins.label(1e6), Some("50+"));
    }

    #[test]
    fn test_values_without_bucket() {
        let bins = BinSpec::length_of_stay();
        assert_eq!(bins.label(0.0), None);
        assert_eq!(bins.label(-3.0), None);
        assert_eq!(bins.label(f64::NAN), None);
    }

    #[test]
    fn test_invalid_specs() {
        let unsorted = BinSpec {
            edges: vec![0.0, 5.0, 1.0],
            labels: vec!["a".into(), "b".into(), "c".into()],
        };
        assert!(unsorted.validate().is_err());

        let mismatched = BinSpec {
            edges: vec![0.0, 1.0],
            labels: vec!["a".into()],
        };
        assert!(mismatched.validate().is_err());
        assert_eq!(mismatched.label(0.5), Some("a"));
        assert_eq!(mismatched.label(2.0), None);
    }
}
