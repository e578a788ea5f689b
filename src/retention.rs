//! Retention campaign economics and offline evaluation metrics

use crate::error::{ChurnError, Result};
use crate::types::prediction::ChurnLabel;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LIFETIME_VALUE: f64 = 2000.0;
pub const DEFAULT_RETENTION_COST: f64 = 300.0;
pub const DEFAULT_SUCCESS_RATE: f64 = 0.6;

/// Confusion-matrix counts, churn as the positive class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfusionMatrix {
    pub true_positives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
    pub true_negatives: u64,
}

impl ConfusionMatrix {
    /// Tally predictions against known outcomes
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (ChurnLabel, ChurnLabel)>,
    {
        let mut matrix = Self::default();
        for (actual, predicted) in pairs {
            matrix.record(actual, predicted);
        }
        matrix
    }

    pub fn record(&mut self, actual: ChurnLabel, predicted: ChurnLabel) {
        match (actual, predicted) {
            (ChurnLabel::Yes, ChurnLabel::Yes) => self.true_positives += 1,
            (ChurnLabel::No, ChurnLabel::Yes) => self.false_positives += 1,
            (ChurnLabel::Yes, ChurnLabel::No) => self.false_negatives += 1,
            (ChurnLabel::No, ChurnLabel::No) => self.true_negatives += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.true_positives + self.false_positives + self.false_negatives + self.true_negatives
    }
}

/// Economic assumptions for a retention campaign
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetentionScenario {
    /// Revenue kept per retained client
    #[serde(default = "default_lifetime_value")]
    pub lifetime_value: f64,
    /// Cost of one retention action
    #[serde(default = "default_retention_cost")]
    pub retention_cost: f64,
    /// Share of contacted churners that stay (0.0 - 1.0)
    #[serde(default = "default_success_rate")]
    pub success_rate: f64,
}

fn default_lifetime_value() -> f64 {
    DEFAULT_LIFETIME_VALUE
}

fn default_retention_cost() -> f64 {
    DEFAULT_RETENTION_COST
}

fn default_success_rate() -> f64 {
    DEFAULT_SUCCESS_RATE
}

impl Default for RetentionScenario {
    fn default() -> Self {
        Self {
            lifetime_value: DEFAULT_LIFETIME_VALUE,
            retention_cost: DEFAULT_RETENTION_COST,
            success_rate: DEFAULT_SUCCESS_RATE,
        }
    }
}

impl RetentionScenario {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.success_rate) {
            return Err(ChurnError::Validation(format!(
                "success_rate must be between 0 and 1, got {}",
                self.success_rate
            )));
        }
        if !self.lifetime_value.is_finite() || self.lifetime_value < 0.0 {
            return Err(ChurnError::Validation(
                "lifetime_value must be a non-negative amount".to_string(),
            ));
        }
        if !self.retention_cost.is_finite() || self.retention_cost < 0.0 {
            return Err(ChurnError::Validation(
                "retention_cost must be a non-negative amount".to_string(),
            ));
        }
        Ok(())
    }

    /// Campaign return when every predicted churner is contacted
    pub fn evaluate(&self, matrix: &ConfusionMatrix) -> Result<RoiReport> {
        self.validate()?;

        let clients_saved = (matrix.true_positives as f64 * self.success_rate).floor() as u64;
        let retained_revenue = clients_saved as f64 * self.lifetime_value;
        let contacted = matrix.true_positives + matrix.false_positives;
        let campaign_cost = contacted as f64 * self.retention_cost;
        let roi = retained_revenue - campaign_cost;
        let roi_percentage = if campaign_cost > 0.0 {
            roi / campaign_cost * 100.0
        } else {
            0.0
        };

        Ok(RoiReport {
            clients_identified: matrix.true_positives,
            clients_contacted: contacted,
            clients_saved,
            retained_revenue,
            campaign_cost,
            roi,
            roi_percentage,
            identification_rate: ratio(
                matrix.true_positives,
                matrix.true_positives + matrix.false_negatives,
            ),
        })
    }
}

/// Outcome of a retention campaign
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiReport {
    pub clients_identified: u64,
    pub clients_contacted: u64,
    pub clients_saved: u64,
    pub retained_revenue: f64,
    pub campaign_cost: f64,
    pub roi: f64,
    pub roi_percentage: f64,
    /// Share of actual churners the model flagged
    pub identification_rate: f64,
}

/// Accuracy, precision, recall and F1 for the churn class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: u64,
}

impl ClassificationMetrics {
    pub fn from_matrix(matrix: &ConfusionMatrix) -> Self {
        let tp = matrix.true_positives;
        let precision = ratio(tp, tp + matrix.false_positives);
        let recall = ratio(tp, tp + matrix.false_negatives);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            accuracy: ratio(tp + matrix.true_negatives, matrix.total()),
            precision,
            recall,
            f1,
            support: matrix.total(),
        }
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(tp: u64, fp: u64, fn_: u64, tn: u64) -> ConfusionMatrix {
        ConfusionMatrix {
            true_positives: tp,
            false_positives: fp,
            false_negatives: fn_,
            true_negatives: tn,
        }
    }

    #[test]
    fn test_default_campaign() {
        let report = RetentionScenario::default()
            .evaluate(&matrix(100, 50, 25, 825))
            .unwrap();

        assert_eq!(report.clients_saved, 60);
        assert_eq!(report.clients_contacted, 150);
        assert_eq!(report.retained_revenue, 120_000.0);
        assert_eq!(report.campaign_cost, 45_000.0);
        assert_eq!(report.roi, 75_000.0);
        assert!((report.roi_percentage - 166.666_666).abs() < 1e-3);
        assert_eq!(report.identification_rate, 0.8);
    }

    #[test]
    fn test_saved_clients_round_down() {
        let report = RetentionScenario::default()
            .evaluate(&matrix(7, 0, 0, 0))
            .unwrap();
        // 7 * 0.6 = 4.2
        assert_eq!(report.clients_saved, 4);
    }

    #[test]
    fn test_zero_denominators() {
        let report = RetentionScenario::default()
            .evaluate(&matrix(0, 0, 0, 10))
            .unwrap();
        assert_eq!(report.campaign_cost, 0.0);
        assert_eq!(report.roi_percentage, 0.0);
        assert_eq!(report.identification_rate, 0.0);

        let metrics = ClassificationMetrics::from_matrix(&ConfusionMatrix::default());
        assert_eq!(metrics.accuracy, 0.0);
        assert_eq!(metrics.f1, 0.0);
    }

    #[test]
    fn test_invalid_success_rate() {
        let scenario = RetentionScenario {
            success_rate: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            scenario.evaluate(&matrix(1, 1, 1, 1)),
            Err(ChurnError::Validation(_))
        ));
    }

    #[test]
    fn test_scenario_defaults_from_json() {
        let scenario: RetentionScenario = serde_json::from_str(r#"{"retention_cost": 150.0}"#).unwrap();
        assert_eq!(scenario.retention_cost, 150.0);
        assert_eq!(scenario.lifetime_value, DEFAULT_LIFETIME_VALUE);
        assert_eq!(scenario.success_rate, DEFAULT_SUCCESS_RATE);
    }

    #[test]
    fn test_classification_metrics() {
        use ChurnLabel::{No, Yes};
        let matrix = ConfusionMatrix::from_pairs([
            (Yes, Yes),
            (Yes, Yes),
            (Yes, No),
            (No, Yes),
            (No, No),
            (No, No),
            (No, No),
            (No, No),
        ]);
        assert_eq!(matrix, self::matrix(2, 1, 1, 4));

        let metrics = ClassificationMetrics::from_matrix(&matrix);
        assert_eq!(metrics.accuracy, 0.75);
        assert!((metrics.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((metrics.recall - 2.0 / 3.0).abs() < 1e-12);
        assert!((metrics.f1 - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(metrics.support, 8);
    }
}
