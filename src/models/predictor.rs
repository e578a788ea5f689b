//! Predictor capability and the logistic regression backend

use crate::error::{ChurnError, Result};
use crate::features::EncodedVector;
use crate::types::prediction::ChurnLabel;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Decision threshold used when a backend has no native label output
pub const DEFAULT_DECISION_THRESHOLD: f64 = 0.5;

/// Binary classifier over aligned feature vectors.
///
/// Implementations are pre-trained and read-only; they must be safe to share
/// between request handlers.
pub trait Predictor: Send + Sync {
    /// Model family name (reported by health checks)
    fn model_type(&self) -> &str;

    /// Input width, when the artifact records it
    fn n_features(&self) -> Option<usize> {
        None
    }

    /// Class probabilities `[p(stay), p(churn)]`
    fn predict_proba(&self, features: &EncodedVector) -> Result<[f64; 2]>;

    /// Predicted class
    fn predict(&self, features: &EncodedVector) -> Result<ChurnLabel> {
        let [_, churn] = self.predict_proba(features)?;
        Ok(ChurnLabel::from_class(
            (churn >= DEFAULT_DECISION_THRESHOLD) as u8,
        ))
    }
}

/// Serialized logistic regression model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegressionArtifact {
    /// Model family tag
    #[serde(default = "default_model_type")]
    pub model_type: String,
    /// One coefficient per schema column
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

fn default_model_type() -> String {
    "LogisticRegression".to_string()
}

/// Logistic regression evaluated natively from exported coefficients.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    model_type: String,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LogisticRegression {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self> {
        Self::from_artifact(LogisticRegressionArtifact {
            model_type: default_model_type(),
            coefficients,
            intercept,
        })
    }

    pub fn from_artifact(artifact: LogisticRegressionArtifact) -> Result<Self> {
        if artifact.coefficients.is_empty() {
            return Err(ChurnError::invalid_artifact(
                "logistic regression",
                "no coefficients",
            ));
        }
        if !artifact.intercept.is_finite() || artifact.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ChurnError::invalid_artifact(
                "logistic regression",
                "coefficients must be finite",
            ));
        }

        Ok(Self {
            model_type: artifact.model_type,
            coefficients: artifact.coefficients,
            intercept: artifact.intercept,
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let artifact: LogisticRegressionArtifact = serde_json::from_str(&content)
            .map_err(|e| ChurnError::invalid_artifact("logistic regression", e.to_string()))?;
        Self::from_artifact(artifact)
    }

    fn decision_function(&self, features: &EncodedVector) -> Result<f64> {
        if features.len() != self.coefficients.len() {
            return Err(ChurnError::Inference(format!(
                "model expects {} features, got {}",
                self.coefficients.len(),
                features.len()
            )));
        }

        Ok(self
            .coefficients
            .iter()
            .zip(features.as_slice())
            .fold(self.intercept, |acc, (w, x)| acc + w * x))
    }
}

impl Predictor for LogisticRegression {
    fn model_type(&self) -> &str {
        &self.model_type
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }

    fn predict_proba(&self, features: &EncodedVector) -> Result<[f64; 2]> {
        let churn = sigmoid(self.decision_function(features)?);
        Ok([1.0 - churn, churn])
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probabilities_sum_to_one() {
        let model = LogisticRegression::new(vec![0.5, -0.25], 0.1).unwrap();
        let [stay, churn] = model
            .predict_proba(&EncodedVector::new(vec![2.0, 4.0]))
            .unwrap();

        // z = 0.1 + 1.0 - 1.0
        assert!((churn - sigmoid(0.1)).abs() < 1e-12);
        assert!((stay + churn - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_predict_uses_half_threshold() {
        let model = LogisticRegression::new(vec![1.0], 0.0).unwrap();
        assert_eq!(
            model.predict(&EncodedVector::new(vec![3.0])).unwrap(),
            ChurnLabel::Yes
        );
        assert_eq!(
            model.predict(&EncodedVector::new(vec![-3.0])).unwrap(),
            ChurnLabel::No
        );
        assert_eq!(
            model.predict(&EncodedVector::new(vec![0.0])).unwrap(),
            ChurnLabel::Yes
        );
    }

    #[test]
    fn test_dimension_mismatch() {
        let model = LogisticRegression::new(vec![1.0, 1.0], 0.0).unwrap();
        assert!(matches!(
            model.predict_proba(&EncodedVector::new(vec![1.0])),
            Err(ChurnError::Inference(_))
        ));
    }

    #[test]
    fn test_artifact_defaults_model_type() {
        let artifact: LogisticRegressionArtifact =
            serde_json::from_str(r#"{"coefficients": [0.2], "intercept": -1.0}"#).unwrap();
        let model = LogisticRegression::from_artifact(artifact).unwrap();
        assert_eq!(model.model_type(), "LogisticRegression");
        assert_eq!(model.n_features(), Some(1));
    }

    #[test]
    fn test_rejects_empty_coefficients() {
        assert!(LogisticRegression::new(vec![], 0.0).is_err());
        assert!(LogisticRegression::new(vec![f64::NAN], 0.0).is_err());
    }
}
