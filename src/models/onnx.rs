//! ONNX Runtime predictor backend

use crate::error::{ChurnError, Result};
use crate::features::EncodedVector;
use crate::models::predictor::Predictor;
use crate::types::prediction::ChurnLabel;
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, Tensor};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Classifier exported to ONNX (e.g. via skl2onnx).
///
/// Handles both tensor probability outputs and the `seq(map(int64, float))`
/// layout produced when the exporter keeps its zipmap node.
pub struct OnnxPredictor {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    label_name: Option<String>,
}

impl OnnxPredictor {
    /// Load a model file into a new ONNX Runtime session
    pub fn load<P: AsRef<Path>>(path: P, threads: usize) -> Result<Self> {
        let path = path.as_ref();
        let _ = ort::init().with_name("churn-risk-pipeline").commit();

        info!(path = %path.display(), threads = threads, "Loading ONNX model");

        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.with_intra_threads(threads))
            .and_then(|b| b.commit_from_file(path))
            .map_err(|e| ChurnError::invalid_artifact(path.display().to_string(), e.to_string()))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "probabilities".to_string());

        let label_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("label"))
            .map(|o| o.name.clone());

        info!(
            input = %input_name,
            output = %output_name,
            label = ?label_name,
            "ONNX model loaded"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            label_name,
        })
    }

    fn run(&self, features: &EncodedVector) -> Result<(f64, Option<i64>)> {
        let values: Vec<f32> = features.as_slice().iter().map(|&v| v as f32).collect();
        let shape = vec![1_i64, values.len() as i64];
        let input = Tensor::from_array((shape, values)).map_err(inference_error)?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| ChurnError::Inference(format!("session lock poisoned: {}", e)))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(inference_error)?;

        let label = self.label_name.as_deref().and_then(|name| {
            outputs
                .get(name)
                .and_then(|v| v.try_extract_tensor::<i64>().ok())
                .and_then(|(_, data)| data.first().copied())
        });

        let probability = extract_probability(&outputs, &self.output_name)?;
        Ok((probability, label))
    }
}

impl Predictor for OnnxPredictor {
    fn model_type(&self) -> &str {
        "OnnxClassifier"
    }

    fn predict_proba(&self, features: &EncodedVector) -> Result<[f64; 2]> {
        let (churn, _) = self.run(features)?;
        Ok([1.0 - churn, churn])
    }

    fn predict(&self, features: &EncodedVector) -> Result<ChurnLabel> {
        let (churn, label) = self.run(features)?;
        let class = match label {
            Some(class) => class as u8,
            None => (churn >= crate::models::predictor::DEFAULT_DECISION_THRESHOLD) as u8,
        };
        Ok(ChurnLabel::from_class(class))
    }
}

fn inference_error(e: ort::Error) -> ChurnError {
    ChurnError::Inference(e.to_string())
}

/// Pull the churn-class probability out of the session outputs
fn extract_probability(outputs: &ort::session::SessionOutputs, output_name: &str) -> Result<f64> {
    if let Some(output) = outputs.get(output_name) {
        if let Some(prob) = extract_from_value(&output) {
            return Ok(prob);
        }
    }

    for (name, output) in outputs.iter() {
        if name.contains("label") {
            continue;
        }
        if let Some(prob) = extract_from_value(&output) {
            debug!(output = %name, prob = prob, "Extracted probability from fallback output");
            return Ok(prob);
        }
    }

    warn!(output = %output_name, "No probability output found");
    Err(ChurnError::Inference(
        "model produced no probability output".to_string(),
    ))
}

fn extract_from_value(output: &ort::value::DynValue) -> Option<f64> {
    if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
        return churn_prob_from_tensor(shape, data);
    }

    let dtype = output.dtype();
    if DynSequenceValueType::can_downcast(&dtype) {
        return extract_from_sequence_map(output).ok();
    }

    None
}

/// `seq(map(int64, float))` output; only batch size 1 is ever submitted
fn extract_from_sequence_map(output: &ort::value::DynValue) -> Result<f64> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(inference_error)?;
    let maps = sequence
        .try_extract_sequence::<DynMapValueType>(&allocator)
        .map_err(inference_error)?;

    let first = maps
        .first()
        .ok_or_else(|| ChurnError::Inference("empty probability sequence".to_string()))?;
    let pairs = first
        .try_extract_key_values::<i64, f32>()
        .map_err(inference_error)?;

    if let Some((_, prob)) = pairs.iter().find(|(class, _)| *class == 1) {
        return Ok(*prob as f64);
    }
    if let Some((_, prob)) = pairs.iter().find(|(class, _)| *class == 0) {
        return Ok(1.0 - *prob as f64);
    }

    Err(ChurnError::Inference(
        "no class probability in output map".to_string(),
    ))
}

/// `[batch, classes]`, `[classes]` or a single probability
fn churn_prob_from_tensor(shape: &ort::tensor::Shape, data: &[f32]) -> Option<f64> {
    let dims: Vec<i64> = shape.iter().copied().collect();
    let classes = dims.last().copied().unwrap_or(0);

    match classes {
        c if c >= 2 => data.get(1).map(|&v| v as f64),
        1 => data.first().map(|&v| v as f64),
        _ => data.last().map(|&v| v as f64),
    }
}
