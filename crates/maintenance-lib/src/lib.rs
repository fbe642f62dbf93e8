//! Predictive maintenance library for transport components
//!
//! This crate provides the core functionality for:
//! - Validating sensor telemetry and deriving model features
//! - Training and serving the failure probability model
//! - Cost-based FIX_NOW / WAIT decisions
//! - Batch jobs, the component status store and a telemetry simulator
//! - Health checks and observability

pub mod batch;
pub mod decision;
pub mod error;
pub mod health;
pub mod ingest;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod service;
pub mod simulation;
pub mod store;

pub use decision::{decide, decide_all, CostModel, Decision};
pub use error::{
    ArtifactError, ConfigError, ExportError, IngestError, ModelUnavailableError, ServiceError,
    StoreError, TrainingDataError, ValidationError,
};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{ServiceMetrics, StructuredLogger};
pub use predictor::{
    DefaultClassifier, FeatureExtractor, ModelRegistry, ModelSwap, ProbabilisticClassifier,
    TrainableClassifier, TrainingConfig,
};
pub use service::MaintenanceService;
pub use store::{ComponentRecord, ComponentStore, ComponentSummary, InMemoryComponentStore};
