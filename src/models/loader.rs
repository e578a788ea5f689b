//! Model bundle loading

use crate::config::ModelsConfig;
use crate::error::{ChurnError, Result};
use crate::features::{FeatureEncoder, FeatureSchema};
use crate::models::predictor::{LogisticRegression, Predictor};
use crate::models::scaler::StandardScaler;
use std::path::Path;
use tracing::{info, warn};

/// Everything needed to score a client: predictor, feature layout and the
/// optional scaler.
///
/// Built once per process and shared read-only afterwards.
pub struct ModelBundle {
    predictor: Box<dyn Predictor>,
    encoder: FeatureEncoder,
    scaler: Option<StandardScaler>,
}

impl ModelBundle {
    /// Assemble a bundle, checking that the scaler matches the schema.
    pub fn new(
        predictor: Box<dyn Predictor>,
        schema: FeatureSchema,
        scaler: Option<StandardScaler>,
    ) -> Result<Self> {
        if let Some(n_features) = predictor.n_features() {
            if n_features != schema.len() {
                return Err(ChurnError::invalid_artifact(
                    "predictor",
                    format!(
                        "trained on {} features but the schema has {}",
                        n_features,
                        schema.len()
                    ),
                ));
            }
        }
        if let Some(scaler) = &scaler {
            if scaler.len() != schema.len() {
                return Err(ChurnError::invalid_artifact(
                    "scaler",
                    format!(
                        "fitted on {} columns but the schema has {}",
                        scaler.len(),
                        schema.len()
                    ),
                ));
            }
        }

        Ok(Self {
            predictor,
            encoder: FeatureEncoder::new(schema),
            scaler,
        })
    }

    pub fn predictor(&self) -> &dyn Predictor {
        self.predictor.as_ref()
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.encoder.schema()
    }

    pub fn scaler(&self) -> Option<&StandardScaler> {
        self.scaler.as_ref()
    }

    pub fn uses_scaler(&self) -> bool {
        self.scaler.is_some()
    }
}

impl std::fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBundle")
            .field("model_type", &self.predictor.model_type())
            .field("features", &self.schema().len())
            .field("uses_scaler", &self.uses_scaler())
            .finish()
    }
}

/// Loader for model bundles stored on disk
pub struct BundleLoader;

impl BundleLoader {
    /// Load predictor, schema and optional scaler from the configured paths.
    ///
    /// A missing predictor or schema is [`ChurnError::BundleNotFound`]; a
    /// missing scaler means features pass through unscaled.
    pub fn load(config: &ModelsConfig) -> Result<ModelBundle> {
        let model_path = config.model_path();
        let schema_path = config.schema_path();
        let scaler_path = config.scaler_path();

        require_artifact(&model_path)?;
        require_artifact(&schema_path)?;

        let schema = FeatureSchema::from_path(&schema_path)?;
        info!(
            path = %schema_path.display(),
            features = schema.len(),
            reference_levels = schema.reference_levels().len(),
            "Feature schema loaded"
        );

        let predictor = Self::load_predictor(&model_path, config.onnx_threads)?;
        info!(
            path = %model_path.display(),
            model_type = %predictor.model_type(),
            "Predictor loaded"
        );

        let scaler = if scaler_path.exists() {
            let scaler = StandardScaler::from_path(&scaler_path)?;
            info!(path = %scaler_path.display(), "Scaler loaded");
            Some(scaler)
        } else {
            warn!(
                path = %scaler_path.display(),
                "Scaler not found, features will not be standardized"
            );
            None
        };

        ModelBundle::new(predictor, schema, scaler)
    }

    fn load_predictor(path: &Path, onnx_threads: usize) -> Result<Box<dyn Predictor>> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match extension.as_str() {
            "json" => Ok(Box::new(LogisticRegression::from_path(path)?)),
            "onnx" => Self::load_onnx(path, onnx_threads),
            other => Err(ChurnError::invalid_artifact(
                path.display().to_string(),
                format!("unsupported model format '{}'", other),
            )),
        }
    }

    #[cfg(feature = "onnx")]
    fn load_onnx(path: &Path, onnx_threads: usize) -> Result<Box<dyn Predictor>> {
        Ok(Box::new(crate::models::onnx::OnnxPredictor::load(
            path,
            onnx_threads,
        )?))
    }

    #[cfg(not(feature = "onnx"))]
    fn load_onnx(path: &Path, _onnx_threads: usize) -> Result<Box<dyn Predictor>> {
        Err(ChurnError::invalid_artifact(
            path.display().to_string(),
            "ONNX models require the `onnx` feature",
        ))
    }
}

fn require_artifact(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ChurnError::BundleNotFound(path.display().to_string()))
    }
}
