//! Churn Risk Service - Main Entry Point
//!
//! Loads the model bundle once and serves churn predictions over HTTP.

use anyhow::{Context, Result};
use churn_risk_pipeline::{
    api::{build_router, AppState},
    config::{AppConfig, LoggingConfig, DEFAULT_CONFIG_PATH},
    metrics::{MetricsReporter, ServiceMetrics},
    models::{BundleLoader, InferenceEngine},
};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "churn-server")]
#[command(about = "Churn risk prediction service", long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(format!("churn_risk_pipeline={0},churn_server={0},tower_http={0}", logging.level))
    })?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::load_from_path(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config))?;
    init_tracing(&config.logging)?;

    info!("Starting Churn Risk Service");
    info!(
        config = %args.config,
        models_dir = %config.models.models_dir,
        "Configuration loaded successfully"
    );

    let engine = match BundleLoader::load(&config.models) {
        Ok(bundle) => {
            info!(
                model_type = %bundle.predictor().model_type(),
                features = bundle.schema().len(),
                uses_scaler = bundle.uses_scaler(),
                "Model bundle loaded"
            );
            InferenceEngine::new(Arc::new(bundle))
        }
        Err(e) if !config.models.require_bundle => {
            warn!(error = %e, "Model bundle unavailable, starting in degraded mode");
            InferenceEngine::unloaded()
        }
        Err(e) => {
            error!(error = %e, "Failed to load model bundle");
            return Err(e).context("Model bundle is required (models.require_bundle = true)");
        }
    };

    let metrics = Arc::new(ServiceMetrics::new());
    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(reporter.start());
    }

    let state = AppState::new(Arc::new(engine)).with_metrics(metrics.clone());
    let app = build_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!(address = %address, "Listening for requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Service shutting down...");
    metrics.print_summary();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}
