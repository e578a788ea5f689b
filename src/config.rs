//! Configuration management for the churn risk service

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub models: ModelsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
}

/// Model artifact locations
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// Directory containing the model artifacts
    pub models_dir: String,
    /// Predictor artifact (`.json` logistic regression or `.onnx`)
    #[serde(default = "default_model_file")]
    pub model_file: String,
    /// Ordered encoded feature names
    #[serde(default = "default_schema_file")]
    pub schema_file: String,
    /// Optional standardization statistics
    #[serde(default = "default_scaler_file")]
    pub scaler_file: String,
    /// Refuse to start when the bundle cannot be loaded
    #[serde(default = "default_require_bundle")]
    pub require_bundle: bool,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_model_file() -> String {
    "churn_model.json".to_string()
}

fn default_schema_file() -> String {
    "feature_schema.json".to_string()
}

fn default_scaler_file() -> String {
    "scaler.json".to_string()
}

fn default_require_bundle() -> bool {
    true
}

fn default_onnx_threads() -> usize {
    1
}

impl ModelsConfig {
    /// Configuration for artifacts under `models_dir` with default file names
    pub fn with_models_dir(models_dir: impl Into<String>) -> Self {
        Self {
            models_dir: models_dir.into(),
            model_file: default_model_file(),
            schema_file: default_schema_file(),
            scaler_file: default_scaler_file(),
            require_bundle: default_require_bundle(),
            onnx_threads: default_onnx_threads(),
        }
    }

    pub fn model_path(&self) -> PathBuf {
        Path::new(&self.models_dir).join(&self.model_file)
    }

    pub fn schema_path(&self) -> PathBuf {
        Path::new(&self.models_dir).join(&self.schema_file)
    }

    pub fn scaler_path(&self) -> PathBuf {
        Path::new(&self.models_dir).join(&self.scaler_file)
    }
}

/// Periodic metrics reporting
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Seconds between logged summaries (0 disables the reporter)
    pub report_interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            report_interval_secs: 60,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Socket address string for the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            models: ModelsConfig::with_models_dir("models"),
            metrics: MetricsConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
