//! HTTP API: prediction, recommendation, component status, health and metrics

use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use maintenance_lib::{
    health::{components, ComponentStatus, HealthRegistry},
    ComponentRecord, ComponentStore, ComponentSummary, DefaultClassifier, FailurePrediction,
    MaintenanceDecision, MaintenanceService, ModelSwap, RawSensorReading,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: MaintenanceService,
    pub store: Arc<dyn ComponentStore>,
    pub health_registry: HealthRegistry,
    /// Artifact reloaded by `POST /admin/reload-model`
    pub model_path: PathBuf,
}

impl AppState {
    pub fn new(
        service: MaintenanceService,
        store: Arc<dyn ComponentStore>,
        health_registry: HealthRegistry,
        model_path: PathBuf,
    ) -> Self {
        Self {
            service,
            store,
            health_registry,
            model_path,
        }
    }
}

async fn predict_failure(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RawSensorReading>, JsonRejection>,
) -> ApiResult<Json<FailurePrediction>> {
    let Json(raw) = body.map_err(|e| {
        state.service.metrics().inc_validation_errors();
        ApiError::from(e)
    })?;
    let reading = state.service.validate(raw)?;
    Ok(Json(state.service.predict(&reading)?))
}

async fn recommend_maintenance(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RawSensorReading>, JsonRejection>,
) -> ApiResult<Json<MaintenanceDecision>> {
    let Json(raw) = body.map_err(|e| {
        state.service.metrics().inc_validation_errors();
        ApiError::from(e)
    })?;
    let reading = state.service.validate(raw)?;
    let decision = state.service.recommend(&reading)?;

    state
        .store
        .upsert(ComponentRecord::from_reading(reading).with_decision(decision.clone()))
        .await?;

    Ok(Json(decision))
}

async fn component_status(
    State(state): State<Arc<AppState>>,
    Path(component_id): Path<String>,
) -> ApiResult<Json<ComponentRecord>> {
    state
        .store
        .component_status(&component_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Component {} not found", component_id)))
}

async fn all_components(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<ComponentSummary>>> {
    Ok(Json(state.store.list_components().await?))
}

/// Swap in the artifact at the configured path. A failed load leaves the
/// serving model in place.
async fn reload_model(State(state): State<Arc<AppState>>) -> ApiResult<Json<ModelSwap>> {
    let registry = Arc::clone(state.service.registry());
    let path = state.model_path.clone();
    let metrics = state.service.metrics();

    let loaded = tokio::task::spawn_blocking(move || registry.load_artifact::<DefaultClassifier>(&path))
        .await
        .map_err(|e| ApiError::ModelLoad(e.to_string()))?;

    match loaded {
        Ok(swap) => {
            metrics.record_model_reload(true);
            metrics.set_model_version(&swap.model_version);
            state.health_registry.set_healthy(components::ESTIMATOR).await;
            Ok(Json(swap))
        }
        Err(e) => {
            metrics.record_model_reload(false);
            Err(e.into())
        }
    }
}

/// Go back to the model that was serving before the last reload
async fn rollback_model(State(state): State<Arc<AppState>>) -> ApiResult<Json<ModelSwap>> {
    let swap = state
        .service
        .registry()
        .rollback()
        .ok_or_else(|| ApiError::Conflict("No previous model to roll back to".to_string()))?;
    state.service.metrics().set_model_version(&swap.model_version);
    Ok(Json(swap))
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still operational
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.service.metrics().render() {
        Ok(buffer) => (
            StatusCode::OK,
            [("content-type", "text/plain; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            e.to_string().into_bytes(),
        ),
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/predict-failure", post(predict_failure))
        .route("/recommend-maintenance", post(recommend_maintenance))
        .route("/get-component-status/:component_id", get(component_status))
        .route("/get-all-components", get(all_components))
        .route("/admin/reload-model", post(reload_model))
        .route("/admin/rollback-model", post(rollback_model))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve(
    port: u16,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
