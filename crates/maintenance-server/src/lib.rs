//! HTTP boundary of the maintenance pipeline

pub mod api;
pub mod config;
pub mod error;

use anyhow::{Context, Result};
use maintenance_lib::{
    health::{components, HealthRegistry},
    ComponentStore, CostModel, DefaultClassifier, InMemoryComponentStore, MaintenanceService,
    ModelRegistry, StructuredLogger,
};
use std::sync::Arc;
use tracing::warn;

pub use api::{create_router, AppState};
pub use config::ServerConfig;

/// Build the shared state. A bad cost document aborts start-up; a missing
/// model or seed file only degrades the matching health component.
pub async fn build_state(config: &ServerConfig) -> Result<Arc<AppState>> {
    let health_registry = HealthRegistry::new();
    let logger = StructuredLogger::new(&config.service_name);

    let cost = match &config.cost_model_path {
        Some(path) => CostModel::from_path(path)
            .with_context(|| format!("Invalid cost model {}", path.display()))?,
        None => CostModel::default(),
    };
    health_registry.set_healthy(components::COST_MODEL).await;

    let registry = Arc::new(ModelRegistry::new());
    let service = MaintenanceService::new(Arc::clone(&registry), cost, logger);
    match registry.load_artifact::<DefaultClassifier>(&config.model_path) {
        Ok(swap) => {
            service.metrics().record_model_reload(true);
            service.metrics().set_model_version(&swap.model_version);
            health_registry.set_healthy(components::ESTIMATOR).await;
        }
        Err(e) => {
            service.metrics().record_model_reload(false);
            health_registry
                .set_degraded(components::ESTIMATOR, format!("No model loaded: {}", e))
                .await;
        }
    }

    let store = match &config.seed_telemetry_path {
        Some(path) => match InMemoryComponentStore::seeded_from(path) {
            Ok(store) => {
                health_registry.set_healthy(components::COMPONENT_STORE).await;
                store
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to seed component store");
                health_registry
                    .set_degraded(components::COMPONENT_STORE, format!("Seed failed: {}", e))
                    .await;
                InMemoryComponentStore::new()
            }
        },
        None => {
            health_registry.set_healthy(components::COMPONENT_STORE).await;
            InMemoryComponentStore::new()
        }
    };
    let store: Arc<dyn ComponentStore> = Arc::new(store);

    Ok(Arc::new(AppState::new(
        service,
        store,
        health_registry,
        config.model_path.clone(),
    )))
}
