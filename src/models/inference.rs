//! Inference engine for churn scoring

use crate::error::{ChurnError, Result};
use crate::features::EncodedVector;
use crate::models::loader::ModelBundle;
use crate::types::client::ClientRecord;
use crate::types::prediction::{BatchPrediction, BatchSummary, PredictionResult};
use std::sync::Arc;
use tracing::debug;

/// Scores client records against a loaded model bundle.
///
/// The bundle is optional so the service can start without artifacts and
/// report itself as degraded.
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    bundle: Option<Arc<ModelBundle>>,
}

impl InferenceEngine {
    pub fn new(bundle: Arc<ModelBundle>) -> Self {
        Self {
            bundle: Some(bundle),
        }
    }

    /// Engine with no model; every prediction fails with `ModelNotLoaded`
    pub fn unloaded() -> Self {
        Self { bundle: None }
    }

    pub fn bundle(&self) -> Option<&ModelBundle> {
        self.bundle.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.bundle.is_some()
    }

    /// Encode, scale and score a single client
    pub fn predict_one(&self, record: &ClientRecord) -> Result<PredictionResult> {
        let bundle = self.bundle().ok_or(ChurnError::ModelNotLoaded)?;

        let features = self.prepare(bundle, record)?;
        let predictor = bundle.predictor();
        let label = predictor.predict(&features)?;
        let [_, churn_probability] = predictor.predict_proba(&features)?;

        let result = PredictionResult::new(label, churn_probability);
        debug!(
            probability = churn_probability,
            risk_level = %result.risk_level.as_str(),
            "Client scored"
        );
        Ok(result)
    }

    /// Score every record in order. The first failing record fails the batch.
    pub fn predict_batch(&self, records: &[ClientRecord]) -> Result<BatchPrediction> {
        if records.is_empty() {
            return Err(ChurnError::EmptyBatch);
        }
        if !self.is_loaded() {
            return Err(ChurnError::ModelNotLoaded);
        }

        let results = records
            .iter()
            .map(|record| self.predict_one(record))
            .collect::<Result<Vec<_>>>()?;
        let summary = BatchSummary::from_results(&results)?;

        debug!(
            total = summary.total,
            high = summary.high,
            medium = summary.medium,
            low = summary.low,
            "Batch scored"
        );
        Ok(BatchPrediction { results, summary })
    }

    fn prepare(&self, bundle: &ModelBundle, record: &ClientRecord) -> Result<EncodedVector> {
        let encoded = bundle.encoder().encode(record);
        match bundle.scaler() {
            Some(scaler) => scaler.transform(&encoded),
            None => Ok(encoded),
        }
    }
}
