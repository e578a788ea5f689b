//! Type definitions for the churn risk pipeline

pub mod client;
pub mod prediction;
pub mod risk;

pub use client::{AttributeValue, ClientRecord};
pub use prediction::{BatchPrediction, BatchSummary, ChurnLabel, PredictionResult};
pub use risk::RiskLevel;
