//! Column contracts: the raw patient record columns, the ordered column list
//! a trained model expects, and alignment of feature tables to that list.

pub mod align;
pub mod columns;
pub mod dates;

use std::path::Path;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::error::util::safe_read_to_string;

pub use align::{AlignedFeatures, AlignmentReport, SchemaAligner};

/// The ordered column names a model was fit on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSchema {
    columns: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaFile {
    List(Vec<String>),
    Object { columns: Vec<String> },
}

impl ModelSchema {
    /// Create a schema from an ordered list of column names
    ///
    /// # Errors
    /// Returns `InvalidConfig` if a column name appears twice
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if let Some(name) = first_duplicate(&columns) {
            return Err(
                Error::InvalidConfig(format!("duplicate column '{name}' in model schema")).into(),
            );
        }
        Ok(Self { columns })
    }

    /// Parse a schema from JSON: either a bare array of names or `{"columns": [...]}`
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: SchemaFile = serde_json::from_str(json)?;
        match parsed {
            SchemaFile::List(columns) | SchemaFile::Object { columns } => Self::new(columns),
        }
    }

    /// Load a schema from a JSON file
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = safe_read_to_string(path, "model schema")?;
        Self::from_json(&json)
    }

    /// Column names in training order
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Whether the schema lists this column
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

fn first_duplicate(columns: &[String]) -> Option<String> {
    let mut seen = FxHashSet::default();
    columns
        .iter()
        .find(|name| !seen.insert(name.as_str()))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_from_json_list_and_object() {
        let list = ModelSchema::from_json(r#"["LOS", "GENDER_F"]"#).unwrap();
        let object = ModelSchema::from_json(r#"{"columns": ["LOS", "GENDER_F"]}"#).unwrap();
        assert_eq!(list, object);
        assert_eq!(list.columns(), &["LOS".to_string(), "GENDER_F".to_string()]);
        assert!(list.contains("GENDER_F"));
        assert!(!list.contains("GENDER_M"));
    }

    #[test]
    fn test_schema_rejects_duplicates() {
        let err = ModelSchema::new(["a", "b", "a"]).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidConfig(_))));
    }
}
