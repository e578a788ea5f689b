use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use churn_risk_pipeline::{
    api::{build_router, AppState},
    config::ModelsConfig,
    models::{BundleLoader, InferenceEngine},
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

fn build_app() -> Router {
    let models_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("models");
    let config = ModelsConfig::with_models_dir(models_dir.to_string_lossy());
    let bundle = BundleLoader::load(&config).unwrap();
    build_router(AppState::new(Arc::new(InferenceEngine::new(Arc::new(bundle)))))
}

fn build_unloaded_app() -> Router {
    build_router(AppState::new(Arc::new(InferenceEngine::unloaded())))
}

fn high_risk_client() -> Value {
    json!({
        "tenure": 2,
        "MonthlyCharges": 89.99,
        "TotalCharges": 179.98,
        "Contract": "Month-to-month",
        "InternetService": "Fiber optic",
        "PaymentMethod": "Electronic check",
        "OnlineSecurity": "No",
        "TechSupport": "No",
        "PaperlessBilling": "Yes",
        "SeniorCitizen": 0
    })
}

fn low_risk_client() -> Value {
    json!({
        "tenure": 60,
        "MonthlyCharges": 55.00,
        "TotalCharges": 3300.00,
        "Contract": "Two year",
        "InternetService": "DSL",
        "PaymentMethod": "Credit card (automatic)",
        "OnlineSecurity": "Yes",
        "TechSupport": "Yes",
        "PaperlessBilling": "No",
        "SeniorCitizen": 1
    })
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

#[tokio::test]
async fn health_reports_loaded_bundle() {
    let (status, body) = send(build_app(), "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["modelo_carregado"], true);
    assert_eq!(body["tipo_modelo"], "LogisticRegression");
    assert_eq!(body["numero_features"], 16);
    assert_eq!(body["usa_scaler"], true);
}

#[tokio::test]
async fn health_reports_missing_bundle() {
    let (status, body) = send(build_unloaded_app(), "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["modelo_carregado"], false);
}

#[tokio::test]
async fn predict_high_risk_client() {
    let (status, body) = send(build_app(), "POST", "/predict", Some(high_risk_client())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predicao"], "Yes");
    assert_eq!(body["nivel_risco"], "HIGH");
    let probability = body["probabilidade_churn"].as_f64().unwrap();
    assert!(probability >= 0.7 && probability <= 1.0);
    assert!(body["acao_recomendada"].as_str().unwrap().contains("retention"));
}

#[tokio::test]
async fn predict_low_risk_client() {
    let (status, body) = send(build_app(), "POST", "/predict", Some(low_risk_client())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predicao"], "No");
    assert_eq!(body["nivel_risco"], "LOW");
    assert!(body["probabilidade_churn"].as_f64().unwrap() < 0.4);
}

#[tokio::test]
async fn probability_is_rounded_to_four_decimals() {
    let (_, body) = send(build_app(), "POST", "/predict", Some(high_risk_client())).await;

    let probability = body["probabilidade_churn"].as_f64().unwrap();
    assert_eq!((probability * 10_000.0).round() / 10_000.0, probability);
}

#[tokio::test]
async fn unknown_contract_is_rejected() {
    let mut client = high_risk_client();
    client["Contract"] = json!("Weekly");

    let (status, body) = send(build_app(), "POST", "/predict", Some(client)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn missing_field_is_rejected() {
    let mut client = high_risk_client();
    client.as_object_mut().unwrap().remove("TotalCharges");

    let (status, _) = send(build_app(), "POST", "/predict", Some(client)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn negative_tenure_is_rejected() {
    let mut client = low_risk_client();
    client["tenure"] = json!(-1);

    let (status, _) = send(build_app(), "POST", "/predict", Some(client)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn predict_without_model_is_unavailable() {
    let (status, body) =
        send(build_unloaded_app(), "POST", "/predict", Some(low_risk_client())).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "MODEL_NOT_LOADED");
}

#[tokio::test]
async fn batch_of_two_clients() {
    let payload = json!({ "clientes": [high_risk_client(), low_risk_client()] });
    let (status, body) = send(build_app(), "POST", "/predict/batch", Some(payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_clientes"], 2);
    assert_eq!(body["resultados"].as_array().unwrap().len(), 2);
    assert_eq!(body["resultados"][0]["nivel_risco"], "HIGH");
    assert_eq!(body["resultados"][1]["nivel_risco"], "LOW");

    let summary = &body["resumo"];
    let counted = summary["alto_risco"].as_u64().unwrap()
        + summary["medio_risco"].as_u64().unwrap()
        + summary["baixo_risco"].as_u64().unwrap();
    assert_eq!(counted, 2);
    assert_eq!(summary["percentual_alto_risco"], 50.0);
}

#[tokio::test]
async fn batch_matches_single_predictions() {
    let app = build_app();
    let (_, single) = send(app.clone(), "POST", "/predict", Some(high_risk_client())).await;
    let payload = json!({ "clientes": [high_risk_client()] });
    let (_, batch) = send(app, "POST", "/predict/batch", Some(payload)).await;

    assert_eq!(batch["resultados"][0], single);
}

#[tokio::test]
async fn empty_batch_is_bad_request() {
    let payload = json!({ "clientes": [] });
    let (status, body) = send(build_app(), "POST", "/predict/batch", Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "EMPTY_BATCH");
}

#[tokio::test]
async fn invalid_record_fails_the_batch() {
    let mut bad = low_risk_client();
    bad["SeniorCitizen"] = json!(2);
    let payload = json!({ "clientes": [high_risk_client(), bad] });

    let (status, body) = send(build_app(), "POST", "/predict/batch", Some(payload)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("clientes[1]"));
}

#[tokio::test]
async fn batch_without_model_is_unavailable() {
    let payload = json!({ "clientes": [low_risk_client()] });
    let (status, _) = send(build_unloaded_app(), "POST", "/predict/batch", Some(payload)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn retention_roi_with_defaults() {
    let payload = json!({
        "true_positives": 100,
        "false_positives": 50,
        "false_negatives": 25,
        "true_negatives": 825
    });
    let (status, body) = send(build_app(), "POST", "/retention/roi", Some(payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clients_saved"], 60);
    assert_eq!(body["campaign_cost"], 45_000.0);
    assert_eq!(body["roi"], 75_000.0);
}

#[tokio::test]
async fn retention_roi_rejects_bad_success_rate() {
    let payload = json!({ "true_positives": 10, "success_rate": 2.0 });
    let (status, _) = send(build_app(), "POST", "/retention/roi", Some(payload)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn metrics_count_served_predictions() {
    let app = build_app();
    send(app.clone(), "POST", "/predict", Some(high_risk_client())).await;
    let payload = json!({ "clientes": [high_risk_client(), low_risk_client()] });
    send(app.clone(), "POST", "/predict/batch", Some(payload)).await;

    let (status, body) = send(app, "GET", "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predictions_served"], 3);
    assert_eq!(body["batches_served"], 1);
    assert_eq!(body["by_risk_level"]["high"], 2);
    assert_eq!(body["by_risk_level"]["low"], 1);
}
