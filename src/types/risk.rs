//! Retention risk classification

use serde::{Deserialize, Serialize};

/// Probability at or above which a client is high risk
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

/// Probability at or above which a client is medium risk
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.4;

pub const HIGH_RISK_ACTION: &str =
    "urgent retention outreach, offer ~25% discount, propose annual contract migration";
pub const MEDIUM_RISK_ACTION: &str = "add to engagement campaign, offer service upgrade";
pub const LOW_RISK_ACTION: &str = "maintain regular communication, loyalty program";

/// Risk tier derived from a churn probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Classify a churn probability. Thresholds are inclusive lower bounds.
    pub fn from_probability(probability: f64) -> Self {
        if probability >= HIGH_RISK_THRESHOLD {
            RiskLevel::High
        } else if probability >= MEDIUM_RISK_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Recommended retention action for this tier
    pub fn recommended_action(&self) -> &'static str {
        match self {
            RiskLevel::High => HIGH_RISK_ACTION,
            RiskLevel::Medium => MEDIUM_RISK_ACTION,
            RiskLevel::Low => LOW_RISK_ACTION,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "HIGH",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::Low => "LOW",
        }
    }
}

/// Map a churn probability to its tier and recommended action.
pub fn classify(probability: f64) -> (RiskLevel, &'static str) {
    let level = RiskLevel::from_probability(probability);
    (level, level.recommended_action())
}
