//! Model artifacts and inference

pub mod inference;
pub mod loader;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod predictor;
pub mod scaler;

pub use inference::InferenceEngine;
pub use loader::{BundleLoader, ModelBundle};
pub use predictor::{LogisticRegression, Predictor};
pub use scaler::StandardScaler;
