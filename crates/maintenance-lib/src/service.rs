//! Request-level façade over extractor, model registry and decision engine
//!
//! Shared by the HTTP server and the CLI so both run one pipeline.

use crate::decision::{decide_prediction, CostModel};
use crate::error::{ServiceError, ValidationError};
use crate::models::{FailurePrediction, MaintenanceDecision, RawSensorReading, SensorReading};
use crate::observability::{ServiceMetrics, StructuredLogger};
use crate::predictor::{FeatureExtractor, ModelRegistry};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

#[derive(Clone)]
pub struct MaintenanceService {
    extractor: FeatureExtractor,
    registry: Arc<ModelRegistry>,
    cost: CostModel,
    metrics: ServiceMetrics,
    logger: StructuredLogger,
}

impl MaintenanceService {
    pub fn new(registry: Arc<ModelRegistry>, cost: CostModel, logger: StructuredLogger) -> Self {
        Self {
            extractor: FeatureExtractor::new(),
            registry,
            cost,
            metrics: ServiceMetrics::new(),
            logger,
        }
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn cost_model(&self) -> &CostModel {
        &self.cost
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    /// Validate a wire record, counting rejections
    pub fn validate(&self, raw: RawSensorReading) -> Result<SensorReading, ValidationError> {
        SensorReading::try_from(raw).map_err(|e| {
            self.metrics.inc_validation_errors();
            debug!(field = ?e.field(), error = %e, "Reading rejected");
            e
        })
    }

    pub fn predict(&self, reading: &SensorReading) -> Result<FailurePrediction, ServiceError> {
        let start = Instant::now();
        let features = self.extractor.extract(reading).map_err(|e| {
            self.metrics.inc_validation_errors();
            e
        })?;
        let (probability, model_version) = self.registry.predict(&features).map_err(|e| {
            self.metrics.inc_model_unavailable();
            e
        })?;
        self.metrics.observe_prediction_latency(start.elapsed().as_secs_f64());
        self.metrics.inc_predictions();

        let prediction = FailurePrediction {
            component_id: reading.component_id.clone(),
            vehicle_id: reading.vehicle_id.clone(),
            failure_probability: probability,
            model_version,
        };
        self.logger.log_prediction(&prediction);
        Ok(prediction)
    }

    /// Predict, then run the cost rule on the result
    pub fn recommend(&self, reading: &SensorReading) -> Result<MaintenanceDecision, ServiceError> {
        let prediction = self.predict(reading)?;
        let decision = decide_prediction(&prediction, &self.cost);
        self.metrics.inc_decision(decision.action.as_str());
        self.logger.log_decision(&decision);
        Ok(decision)
    }
}
