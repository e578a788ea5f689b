//! Frozen standardization applied to encoded vectors

use crate::error::{ChurnError, Result};
use crate::features::EncodedVector;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Column-wise `(x - mean) / scale` with statistics fitted at training time.
///
/// Never refit at inference time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        if mean.len() != scale.len() {
            return Err(ChurnError::invalid_artifact(
                "scaler",
                format!(
                    "mean has {} entries but scale has {}",
                    mean.len(),
                    scale.len()
                ),
            ));
        }
        if mean.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
            return Err(ChurnError::invalid_artifact(
                "scaler",
                "statistics must be finite",
            ));
        }
        Ok(Self { mean, scale })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw: StandardScaler = serde_json::from_str(json)
            .map_err(|e| ChurnError::invalid_artifact("scaler", e.to_string()))?;
        Self::new(raw.mean, raw.scale)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Number of columns the scaler was fitted on
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Standardize a vector. A zero scale is treated as 1.0.
    pub fn transform(&self, vector: &EncodedVector) -> Result<EncodedVector> {
        if vector.len() != self.len() {
            return Err(ChurnError::Inference(format!(
                "scaler expects {} features, got {}",
                self.len(),
                vector.len()
            )));
        }

        let values = vector
            .as_slice()
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(&x, (&mean, &scale))| {
                let scale = if scale == 0.0 { 1.0 } else { scale };
                (x - mean) / scale
            })
            .collect();

        Ok(EncodedVector::new(values))
    }
}
