//! Encoded feature layout fixed at training time

use crate::error::{ChurnError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Ordered column names the predictor was trained on, plus the reference
/// (dropped) level of each categorical field.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSchema {
    columns: Vec<String>,
    reference_levels: BTreeMap<String, String>,
}

/// On-disk representations accepted for the schema artifact
#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaFile {
    Full {
        columns: Vec<String>,
        #[serde(default)]
        reference_levels: BTreeMap<String, String>,
    },
    Columns(Vec<String>),
}

impl FeatureSchema {
    /// Build a schema, rejecting empty or duplicated column lists.
    pub fn new(columns: Vec<String>, reference_levels: BTreeMap<String, String>) -> Result<Self> {
        if columns.is_empty() {
            return Err(ChurnError::invalid_artifact(
                "feature schema",
                "column list is empty",
            ));
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(ChurnError::invalid_artifact(
                    "feature schema",
                    format!("duplicate column '{}'", column),
                ));
            }
        }

        Ok(Self {
            columns,
            reference_levels,
        })
    }

    /// Parse the JSON artifact: either `{"columns": [...], "reference_levels": {...}}`
    /// or a bare array of column names.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: SchemaFile = serde_json::from_str(json)
            .map_err(|e| ChurnError::invalid_artifact("feature schema", e.to_string()))?;

        match file {
            SchemaFile::Full {
                columns,
                reference_levels,
            } => Self::new(columns, reference_levels),
            SchemaFile::Columns(columns) => Self::new(columns, BTreeMap::new()),
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Persisted reference level for a categorical field, if recorded
    pub fn reference_level(&self, field: &str) -> Option<&str> {
        self.reference_levels.get(field).map(String::as_str)
    }

    pub fn reference_levels(&self) -> &BTreeMap<String, String> {
        &self.reference_levels
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_schema() {
        let json = r#"{
            "columns": ["tenure", "Contract_One year", "Contract_Two year"],
            "reference_levels": {"Contract": "Month-to-month"}
        }"#;
        let schema = FeatureSchema::from_json(json).unwrap();

        assert_eq!(schema.len(), 3);
        assert_eq!(schema.reference_level("Contract"), Some("Month-to-month"));
        assert_eq!(schema.reference_level("TechSupport"), None);
        assert_eq!(schema.position("Contract_Two year"), Some(2));
    }

    #[test]
    fn test_parse_bare_column_list() {
        let schema = FeatureSchema::from_json(r#"["tenure", "MonthlyCharges"]"#).unwrap();
        assert_eq!(schema.columns(), &["tenure".to_string(), "MonthlyCharges".to_string()]);
        assert!(schema.reference_levels().is_empty());
    }

    #[test]
    fn test_rejects_duplicates_and_empty() {
        assert!(FeatureSchema::from_json(r#"["tenure", "tenure"]"#).is_err());
        assert!(FeatureSchema::from_json("[]").is_err());
        assert!(FeatureSchema::from_json(r#"{"rows": 3}"#).is_err());
    }
}
