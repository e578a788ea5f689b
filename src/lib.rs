//! Churn Risk Pipeline Library
//!
//! Inference-time scoring for a pre-trained telecom churn classifier:
//! client records are one-hot encoded, reconciled against the training
//! feature schema, standardized and scored, then mapped to a retention
//! risk tier with a recommended action.

pub mod api;
pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod metrics;
pub mod models;
pub mod retention;
pub mod types;

pub use config::AppConfig;
pub use error::{ChurnError, Result};
pub use features::{EncodedVector, FeatureEncoder, FeatureSchema};
pub use models::{BundleLoader, InferenceEngine, ModelBundle};
pub use types::{
    client::ClientRecord,
    prediction::{BatchPrediction, BatchSummary, PredictionResult},
    risk::RiskLevel,
};
