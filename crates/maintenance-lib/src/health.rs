//! Health of the pipeline parts behind `/healthz` and `/readyz`

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Ordered from best to worst, so the overall status is the maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Still serving, with reduced capability
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    fn now(status: ComponentStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: HashMap<String, ComponentHealth>,
}

impl HealthResponse {
    /// Worst status across parts; nothing registered counts as healthy
    pub fn overall(components: &HashMap<String, ComponentHealth>) -> ComponentStatus {
        components
            .values()
            .map(|h| h.status)
            .max()
            .unwrap_or(ComponentStatus::Healthy)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Names of the tracked pipeline parts
pub mod components {
    pub const ESTIMATOR: &str = "estimator";
    pub const COST_MODEL: &str = "cost_model";
    pub const COMPONENT_STORE: &str = "component_store";
}

#[derive(Debug, Default)]
struct HealthState {
    components: HashMap<String, ComponentHealth>,
    started: bool,
}

#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    state: Arc<RwLock<HealthState>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    async fn set(&self, name: &str, health: ComponentHealth) {
        self.state.write().await.components.insert(name.to_string(), health);
    }

    pub async fn set_healthy(&self, name: &str) {
        self.set(name, ComponentHealth::now(ComponentStatus::Healthy, None)).await;
    }

    pub async fn set_degraded(&self, name: &str, message: impl Into<String>) {
        self.set(name, ComponentHealth::now(ComponentStatus::Degraded, Some(message.into())))
            .await;
    }

    /// Mark start-up as finished
    pub async fn set_ready(&self, ready: bool) {
        self.state.write().await.started = ready;
    }

    pub async fn health(&self) -> HealthResponse {
        let components = self.state.read().await.components.clone();
        HealthResponse {
            status: HealthResponse::overall(&components),
            components,
        }
    }

    /// Ready once start-up finished and the estimator has a model to serve
    pub async fn readiness(&self) -> ReadinessResponse {
        let state = self.state.read().await;
        let estimator = state.components.get(components::ESTIMATOR).map(|h| h.status);

        let reason = if !state.started {
            Some("Service not yet initialized")
        } else if HealthResponse::overall(&state.components) == ComponentStatus::Unhealthy {
            Some("Critical component unhealthy")
        } else if estimator != Some(ComponentStatus::Healthy) {
            Some("No failure model loaded")
        } else {
            None
        };

        ReadinessResponse {
            ready: reason.is_none(),
            reason: reason.map(str::to_string),
        }
    }
}
