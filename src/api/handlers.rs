use crate::api::AppState;
use crate::error::{ChurnError, Result};
use crate::metrics::MetricsSnapshot;
use crate::retention::{ConfusionMatrix, RetentionScenario, RoiReport};
use crate::types::client::ClientRecord;
use crate::types::prediction::{round_to, BatchSummary, PredictionResult};
use crate::types::risk::RiskLevel;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::info;

/// Decimal places of the probability returned to clients
const PROBABILITY_DECIMALS: i32 = 4;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let response = match state.engine.bundle() {
        Some(bundle) => HealthResponse {
            status: "healthy".to_string(),
            modelo_carregado: true,
            tipo_modelo: Some(bundle.predictor().model_type().to_string()),
            numero_features: Some(bundle.schema().len()),
            usa_scaler: Some(bundle.uses_scaler()),
            mensagem: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        None => HealthResponse {
            status: "unhealthy".to_string(),
            modelo_carregado: false,
            tipo_modelo: None,
            numero_features: None,
            usa_scaler: None,
            mensagem: Some("model bundle not loaded".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };
    Json(response)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub modelo_carregado: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_modelo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numero_features: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usa_scaler: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mensagem: Option<String>,
    pub version: String,
}

/// Score a single client
pub async fn predict(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<PredictionResponse>> {
    let start = Instant::now();

    let result = ClientRecord::from_json_value(body)
        .and_then(|record| state.engine.predict_one(&record))
        .map_err(|e| rejected(&state, e))?;

    state
        .metrics
        .record_prediction(start.elapsed(), result.churn_probability, result.risk_level);

    Ok(Json(PredictionResponse::from(&result)))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// "Yes" when the client is predicted to churn
    pub predicao: String,
    pub probabilidade_churn: f64,
    pub nivel_risco: RiskLevel,
    pub acao_recomendada: String,
}

impl From<&PredictionResult> for PredictionResponse {
    fn from(result: &PredictionResult) -> Self {
        Self {
            predicao: result.label.as_str().to_string(),
            probabilidade_churn: round_to(result.churn_probability, PROBABILITY_DECIMALS),
            nivel_risco: result.risk_level,
            acao_recomendada: result.recommended_action.clone(),
        }
    }
}

/// Score a batch of clients
pub async fn predict_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchResponse>> {
    let start = Instant::now();

    let batch = parse_batch(request.clientes)
        .and_then(|records| {
            if !state.engine.is_loaded() {
                return Err(ChurnError::ModelNotLoaded);
            }
            state.engine.predict_batch(&records)
        })
        .map_err(|e| rejected(&state, e))?;

    let per_client = start.elapsed() / batch.summary.total as u32;
    for result in &batch.results {
        state
            .metrics
            .record_prediction(per_client, result.churn_probability, result.risk_level);
    }
    state.metrics.record_batch();

    info!(
        total = batch.summary.total,
        high = batch.summary.high,
        high_percentage = batch.summary.high_percentage,
        "Batch scored"
    );

    Ok(Json(BatchResponse {
        resultados: batch.results.iter().map(PredictionResponse::from).collect(),
        total_clientes: batch.summary.total,
        resumo: SummaryResponse::from(&batch.summary),
    }))
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub clientes: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchResponse {
    pub resultados: Vec<PredictionResponse>,
    pub total_clientes: usize,
    pub resumo: SummaryResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub alto_risco: usize,
    pub medio_risco: usize,
    pub baixo_risco: usize,
    pub percentual_alto_risco: f64,
}

impl From<&BatchSummary> for SummaryResponse {
    fn from(summary: &BatchSummary) -> Self {
        Self {
            alto_risco: summary.high,
            medio_risco: summary.medium,
            baixo_risco: summary.low,
            percentual_alto_risco: summary.high_percentage,
        }
    }
}

/// Validate every record, naming the first invalid one by position
fn parse_batch(values: Vec<Value>) -> Result<Vec<ClientRecord>> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            ClientRecord::from_json_value(value).map_err(|e| match e {
                ChurnError::Validation(message) => {
                    ChurnError::Validation(format!("clientes[{}]: {}", index, message))
                }
                other => other,
            })
        })
        .collect()
}

/// Serving counters
pub async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

/// Return on a retention campaign for the given confusion-matrix counts
pub async fn retention_roi(
    State(state): State<AppState>,
    Json(request): Json<RoiRequest>,
) -> Result<Json<RoiReport>> {
    let report = request
        .scenario
        .evaluate(&request.matrix)
        .map_err(|e| rejected(&state, e))?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct RoiRequest {
    #[serde(flatten)]
    pub matrix: ConfusionMatrix,
    #[serde(flatten)]
    pub scenario: RetentionScenario,
}

fn rejected(state: &AppState, error: ChurnError) -> ChurnError {
    state.metrics.record_rejection();
    error
}
