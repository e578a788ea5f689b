//! HTTP serving boundary

pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::metrics::ServiceMetrics;
use crate::models::InferenceEngine;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<InferenceEngine>,
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    pub fn new(engine: Arc<InferenceEngine>) -> Self {
        Self {
            engine,
            metrics: Arc::new(ServiceMetrics::new()),
        }
    }

    /// Share an existing metrics collector (e.g. with the reporter task)
    pub fn with_metrics(mut self, metrics: Arc<ServiceMetrics>) -> Self {
        self.metrics = metrics;
        self
    }
}
