//! Prediction outputs and batch summaries

use crate::error::{ChurnError, Result};
use crate::types::risk::RiskLevel;
use serde::{Deserialize, Serialize};

/// Binary churn class predicted by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChurnLabel {
    /// Class 0: client stays
    No,
    /// Class 1: client churns
    Yes,
}

impl ChurnLabel {
    pub fn from_class(class: u8) -> Self {
        if class == 1 {
            ChurnLabel::Yes
        } else {
            ChurnLabel::No
        }
    }

    pub fn class(&self) -> u8 {
        match self {
            ChurnLabel::No => 0,
            ChurnLabel::Yes => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChurnLabel::No => "No",
            ChurnLabel::Yes => "Yes",
        }
    }
}

/// Decision for a single client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted class
    pub label: ChurnLabel,
    /// Churn probability (0.0 - 1.0)
    pub churn_probability: f64,
    /// Risk tier derived from the probability
    pub risk_level: RiskLevel,
    /// Retention action for the tier
    pub recommended_action: String,
}

impl PredictionResult {
    pub fn new(label: ChurnLabel, churn_probability: f64) -> Self {
        let risk_level = RiskLevel::from_probability(churn_probability);
        Self {
            label,
            churn_probability,
            risk_level,
            recommended_action: risk_level.recommended_action().to_string(),
        }
    }
}

/// Per-tier counts for a batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub total: usize,
    /// High-tier share of the batch, in percent, rounded to one decimal
    pub high_percentage: f64,
}

impl BatchSummary {
    /// Recompute the summary from a batch of results.
    pub fn from_results(results: &[PredictionResult]) -> Result<Self> {
        if results.is_empty() {
            return Err(ChurnError::EmptyBatch);
        }

        let (mut high, mut medium, mut low) = (0, 0, 0);
        for result in results {
            match result.risk_level {
                RiskLevel::High => high += 1,
                RiskLevel::Medium => medium += 1,
                RiskLevel::Low => low += 1,
            }
        }

        let total = results.len();
        Ok(Self {
            high,
            medium,
            low,
            total,
            high_percentage: round_to(high as f64 / total as f64 * 100.0, 1),
        })
    }

    pub fn count(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::High => self.high,
            RiskLevel::Medium => self.medium,
            RiskLevel::Low => self.low,
        }
    }
}

/// Results of a batch in input order, with their summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPrediction {
    pub results: Vec<PredictionResult>,
    pub summary: BatchSummary,
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
