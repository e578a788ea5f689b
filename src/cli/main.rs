//! Churn Risk CLI
//!
//! Offline scoring, evaluation and campaign analysis against a model bundle
//! on disk.

use anyhow::{Context, Result};
use churn_risk_pipeline::{
    config::ModelsConfig,
    dataset,
    models::{BundleLoader, InferenceEngine},
    retention::{ClassificationMetrics, ConfusionMatrix, RetentionScenario},
    ClientRecord,
};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::io::Read;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "churn-cli")]
#[command(about = "Churn risk scoring CLI", long_about = None)]
struct Cli {
    /// Directory containing the model bundle
    #[arg(short, long, default_value = "models", global = true)]
    models_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one client record
    Predict {
        /// JSON file with the record ("-" for stdin)
        #[arg(value_name = "FILE", default_value = "-")]
        input: String,
    },

    /// Score a JSON array or JSON-lines file of records
    Batch {
        #[arg(value_name = "FILE", default_value = "-")]
        input: String,

        /// Print only the summary
        #[arg(short, long)]
        summary_only: bool,
    },

    /// Compare predictions with the `Churn` label of each record
    Evaluate {
        #[arg(value_name = "FILE", default_value = "-")]
        input: String,

        #[command(flatten)]
        scenario: ScenarioArgs,
    },

    /// Print the feature schema of the loaded bundle
    Schema,

    /// Retention campaign return for given confusion-matrix counts
    Roi {
        /// Churners flagged by the model
        #[arg(long)]
        tp: u64,

        /// Non-churners flagged by the model
        #[arg(long)]
        fp: u64,

        /// Churners the model missed
        #[arg(long = "fn")]
        fn_: u64,

        #[arg(long, default_value = "0")]
        tn: u64,

        #[command(flatten)]
        scenario: ScenarioArgs,
    },
}

#[derive(clap::Args)]
struct ScenarioArgs {
    /// Revenue kept per retained client
    #[arg(long, default_value = "2000")]
    ltv: f64,

    /// Cost of one retention action
    #[arg(long, default_value = "300")]
    cost: f64,

    /// Share of contacted churners that stay
    #[arg(long, default_value = "0.6")]
    success_rate: f64,
}

impl From<&ScenarioArgs> for RetentionScenario {
    fn from(args: &ScenarioArgs) -> Self {
        RetentionScenario {
            lifetime_value: args.ltv,
            retention_cost: args.cost,
            success_rate: args.success_rate,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("churn_risk_pipeline=warn".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Predict { input } => {
            let engine = load_engine(&cli.models_dir)?;
            let value: serde_json::Value =
                serde_json::from_str(&read_input(input)?).context("Input is not valid JSON")?;
            let record = ClientRecord::from_json_value(value)?;
            let result = engine.predict_one(&record)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Batch {
            input,
            summary_only,
        } => {
            let engine = load_engine(&cli.models_dir)?;
            let records = dataset::parse_records(&read_input(input)?)?;
            let batch = engine.predict_batch(&records)?;
            if *summary_only {
                println!("{}", serde_json::to_string_pretty(&batch.summary)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&batch)?);
            }
        }

        Commands::Evaluate { input, scenario } => {
            let engine = load_engine(&cli.models_dir)?;
            let labeled = dataset::parse_labeled(&read_input(input)?)?;

            let mut matrix = ConfusionMatrix::default();
            for (record, actual) in &labeled {
                let result = engine.predict_one(record)?;
                matrix.record(*actual, result.label);
            }
            info!(records = labeled.len(), "Evaluation complete");

            let report = RetentionScenario::from(scenario).evaluate(&matrix)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "confusion_matrix": matrix,
                    "metrics": ClassificationMetrics::from_matrix(&matrix),
                    "retention": report,
                }))?
            );
        }

        Commands::Schema => {
            let engine = load_engine(&cli.models_dir)?;
            let bundle = engine
                .bundle()
                .context("Model bundle not loaded")?;
            println!("{}", serde_json::to_string_pretty(bundle.schema())?);
        }

        Commands::Roi {
            tp,
            fp,
            fn_,
            tn,
            scenario,
        } => {
            let matrix = ConfusionMatrix {
                true_positives: *tp,
                false_positives: *fp,
                false_negatives: *fn_,
                true_negatives: *tn,
            };
            let report = RetentionScenario::from(scenario).evaluate(&matrix)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn load_engine(models_dir: &str) -> Result<InferenceEngine> {
    let config = ModelsConfig::with_models_dir(models_dir);
    let bundle = BundleLoader::load(&config)
        .with_context(|| format!("Failed to load model bundle from {}", models_dir))?;
    Ok(InferenceEngine::new(Arc::new(bundle)))
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))
    }
}
