//! Integration tests for the maintenance API endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use maintenance_lib::{
    predictor::LabeledSample, simulation::TelemetrySimulator, DefaultClassifier, FeatureExtractor,
    ProbabilisticClassifier, TrainableClassifier, TrainingConfig,
};
use maintenance_server::{build_state, create_router, AppState, ServerConfig};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn train_model(seed: u64) -> DefaultClassifier {
    let extractor = FeatureExtractor::new();
    let samples: Vec<LabeledSample> = TelemetrySimulator::seeded(seed)
        .unwrap()
        .generate(300)
        .iter()
        .map(|r| LabeledSample::weakly_labeled(extractor.extract(r).unwrap()))
        .collect();
    DefaultClassifier::train(&samples, &TrainingConfig::default())
        .unwrap()
        .model
}

fn write_model(path: &Path, seed: u64) -> String {
    train_model(seed).save(path).unwrap()
}

async fn setup_app(dir: &TempDir, with_model: bool) -> (Router, Arc<AppState>) {
    let model_path = dir.path().join("model").join("failure_predictor.json");
    if with_model {
        write_model(&model_path, 42);
    }
    let config = ServerConfig {
        model_path,
        ..Default::default()
    };
    let state = build_state(&config).await.unwrap();
    state.health_registry.set_ready(true).await;
    (create_router(state.clone()), state)
}

fn reading(component_id: &str, motor_code: &str) -> Value {
    json!({
        "component_id": component_id,
        "vehicle_id": "VH-4821",
        "timestamp": "2026-10-16T08:15:30.123456",
        "location": {"latitude": 6.52, "longitude": 3.37},
        "battery": {"temperature": 66.4, "voltage": 12.3, "error_code": "OK"},
        "motor": {"vibration_level": 0.48, "torque": 31.2, "error_code": motor_code},
        "brake_system": {"brake_pad_thickness": 0.9, "temperature": 75.1, "error_code": "NONE"},
        "last_service_date": "2026-08-01",
        "component_age_days": 120
    })
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_predict_failure_returns_probability() {
    let dir = TempDir::new().unwrap();
    let (app, state) = setup_app(&dir, true).await;

    let (status, body) = send(&app, post_json("/predict-failure", reading("c-1", "OK").to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["component_id"], "c-1");
    assert_eq!(body["vehicle_id"], "VH-4821");
    let p = body["failure_probability"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&p));
    assert_eq!(
        body["model_version"].as_str(),
        state.service.registry().model_version().as_deref()
    );
}

#[tokio::test]
async fn test_missing_field_is_422_with_field_name() {
    let dir = TempDir::new().unwrap();
    let (app, _state) = setup_app(&dir, true).await;

    let mut body = reading("c-1", "OK");
    body["battery"].as_object_mut().unwrap().remove("temperature");
    let (status, error) = send(&app, post_json("/predict-failure", body.to_string())).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["error"], "validation_error");
    assert_eq!(error["field"], "battery.temperature");
}

#[tokio::test]
async fn test_unknown_error_code_is_422() {
    let dir = TempDir::new().unwrap();
    let (app, _state) = setup_app(&dir, true).await;

    let (status, error) = send(
        &app,
        post_json("/recommend-maintenance", reading("c-1", "MELTDOWN").to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["field"], "motor.error_code");
}

#[tokio::test]
async fn test_malformed_json_is_422() {
    let dir = TempDir::new().unwrap();
    let (app, _state) = setup_app(&dir, true).await;

    let (status, error) = send(&app, post_json("/predict-failure", "{ not json".to_string())).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["error"], "validation_error");
}

#[tokio::test]
async fn test_no_model_is_503() {
    let dir = TempDir::new().unwrap();
    let (app, _state) = setup_app(&dir, false).await;

    let (status, error) = send(&app, post_json("/predict-failure", reading("c-1", "OK").to_string())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error["error"], "model_unavailable");

    // Degraded estimator keeps liveness green but readiness red
    let (status, health) = send(&app, get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "degraded");

    let (status, readiness) = send(&app, get("/readyz")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(readiness["ready"], false);
}

#[tokio::test]
async fn test_recommend_stores_decision() {
    let dir = TempDir::new().unwrap();
    let (app, _state) = setup_app(&dir, true).await;

    let (status, decision) = send(
        &app,
        post_json("/recommend-maintenance", reading("c-9", "ERR_VIB").to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decision["action"], "FIX_NOW");
    assert!(decision["explanation"].as_str().unwrap().len() > 10);

    let (status, record) = send(&app, get("/get-component-status/c-9")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["component_id"], "c-9");
    assert_eq!(record["last_decision"]["action"], "FIX_NOW");
    assert_eq!(record["reading"]["brake_system"]["brake_pad_thickness"], 0.9);

    let (status, all) = send(&app, get("/get-all-components")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all, json!([{"component_id": "c-9", "vehicle_id": "VH-4821"}]));
}

#[tokio::test]
async fn test_unknown_component_is_404() {
    let dir = TempDir::new().unwrap();
    let (app, _state) = setup_app(&dir, true).await;

    let (status, error) = send(&app, get("/get-component-status/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "not_found");
}

#[tokio::test]
async fn test_reload_model_swaps_version() {
    let dir = TempDir::new().unwrap();
    let (app, state) = setup_app(&dir, true).await;
    let first = state.service.registry().model_version().unwrap();

    // Different seed, different parameters, different checksum
    let second = write_model(&state.model_path, 7);
    assert_ne!(first, second);

    let (status, body) = send(&app, post_json("/admin/reload-model", String::new())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_version"], second);
    assert_eq!(body["previous_version"], first);
    assert_eq!(state.service.registry().model_version(), Some(second));
}

#[tokio::test]
async fn test_failed_reload_keeps_serving() {
    let dir = TempDir::new().unwrap();
    let (app, state) = setup_app(&dir, true).await;
    let serving = state.service.registry().model_version();

    std::fs::write(&state.model_path, b"{\"format_version\": 1}").unwrap();
    let (status, error) = send(&app, post_json("/admin/reload-model", String::new())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error["error"], "model_load_failed");

    assert_eq!(state.service.registry().model_version(), serving);
    let (status, _) = send(&app, post_json("/predict-failure", reading("c-1", "OK").to_string())).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_rollback_restores_previous_model() {
    let dir = TempDir::new().unwrap();
    let (app, state) = setup_app(&dir, true).await;
    let first = state.service.registry().model_version().unwrap();

    // Only one model so far
    let (status, error) = send(&app, post_json("/admin/rollback-model", String::new())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["error"], "conflict");

    let second = write_model(&state.model_path, 7);
    let (status, _) = send(&app, post_json("/admin/reload-model", String::new())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, post_json("/admin/rollback-model", String::new())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_version"], first);
    assert_eq!(body["previous_version"], second);
    assert_eq!(state.service.registry().model_version(), Some(first.clone()));

    let (status, prediction) = send(&app, post_json("/predict-failure", reading("c-1", "OK").to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prediction["model_version"], first);
}

#[tokio::test]
async fn test_readyz_ok_with_model() {
    let dir = TempDir::new().unwrap();
    let (app, _state) = setup_app(&dir, true).await;

    let (status, readiness) = send(&app, get("/readyz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(readiness["ready"], true);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let dir = TempDir::new().unwrap();
    let (app, _state) = setup_app(&dir, true).await;
    send(&app, post_json("/recommend-maintenance", reading("c-1", "OK").to_string())).await;

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("maintenance_predictions_total"));
    assert!(text.contains("maintenance_decisions_total"));
}

#[tokio::test]
async fn test_invalid_cost_model_aborts_startup() {
    let dir = TempDir::new().unwrap();
    let cost_path: PathBuf = dir.path().join("cost.json");
    std::fs::write(&cost_path, r#"{"threshold": 1.5}"#).unwrap();

    let config = ServerConfig {
        model_path: dir.path().join("absent.json"),
        cost_model_path: Some(cost_path),
        ..Default::default()
    };
    assert!(build_state(&config).await.is_err());
}

#[tokio::test]
async fn test_seeded_store_lists_components() {
    let dir = TempDir::new().unwrap();
    let seed_path = dir.path().join("telemetry.jsonl");
    let readings = TelemetrySimulator::seeded(5).unwrap().generate(4);
    maintenance_lib::ingest::write_ndjson(&seed_path, &readings).unwrap();

    let config = ServerConfig {
        model_path: dir.path().join("absent.json"),
        seed_telemetry_path: Some(seed_path),
        ..Default::default()
    };
    let state = build_state(&config).await.unwrap();
    let app = create_router(state);

    let (status, all) = send(&app, get("/get-all-components")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 4);

    let id = readings[0].component_id.clone();
    let (status, record) = send(&app, get(&format!("/get-component-status/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(record.get("last_decision").is_none());
}
