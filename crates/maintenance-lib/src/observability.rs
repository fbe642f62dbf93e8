//! Observability for the maintenance pipeline
//!
//! Prometheus metrics live in the process-global registry and are exposed by
//! the server at `/metrics`. [`StructuredLogger`] tags every significant
//! event with an `event` field so JSON logs can be filtered by type.

use crate::models::{FailurePrediction, MaintenanceDecision};
use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_counter_vec,
    Encoder, GaugeVec, Histogram, IntCounter, IntCounterVec, TextEncoder,
};
use std::sync::OnceLock;
use tracing::info;

/// Latency buckets in seconds
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

static GLOBAL_METRICS: OnceLock<ServiceMetricsInner> = OnceLock::new();

struct ServiceMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions: IntCounter,
    decisions: IntCounterVec,
    validation_errors: IntCounter,
    model_unavailable: IntCounter,
    model_reloads: IntCounterVec,
    model_version_info: GaugeVec,
}

impl ServiceMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "maintenance_prediction_latency_seconds",
                "Time spent extracting features and scoring one reading",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions: register_int_counter!(
                "maintenance_predictions_total",
                "Failure probabilities computed"
            )
            .expect("Failed to register predictions_total"),

            decisions: register_int_counter_vec!(
                "maintenance_decisions_total",
                "Maintenance decisions by action",
                &["action"]
            )
            .expect("Failed to register decisions_total"),

            validation_errors: register_int_counter!(
                "maintenance_validation_errors_total",
                "Readings rejected as malformed"
            )
            .expect("Failed to register validation_errors_total"),

            model_unavailable: register_int_counter!(
                "maintenance_model_unavailable_total",
                "Requests refused because no model was loaded"
            )
            .expect("Failed to register model_unavailable_total"),

            model_reloads: register_int_counter_vec!(
                "maintenance_model_reloads_total",
                "Model artifact load attempts by outcome",
                &["outcome"]
            )
            .expect("Failed to register model_reloads_total"),

            model_version_info: register_gauge_vec!(
                "maintenance_model_version_info",
                "Currently served failure model",
                &["version"]
            )
            .expect("Failed to register model_version_info"),
        }
    }
}

/// Handle to the global metrics; clones share the same series
#[derive(Clone)]
pub struct ServiceMetrics {
    _private: (),
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ServiceMetricsInner {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self) {
        self.inner().predictions.inc();
    }

    pub fn inc_decision(&self, action: &str) {
        self.inner().decisions.with_label_values(&[action]).inc();
    }

    pub fn inc_validation_errors(&self) {
        self.inner().validation_errors.inc();
    }

    pub fn inc_model_unavailable(&self) {
        self.inner().model_unavailable.inc();
    }

    pub fn record_model_reload(&self, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        self.inner().model_reloads.with_label_values(&[outcome]).inc();
    }

    /// Replace the served-version series with a single `1` sample
    pub fn set_model_version(&self, version: &str) {
        self.inner().model_version_info.reset();
        self.inner()
            .model_version_info
            .with_label_values(&[version])
            .set(1.0);
    }

    /// Text exposition of every registered metric
    pub fn render(&self) -> Result<Vec<u8>, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
        Ok(buffer)
    }
}

/// Event-tagged logging for the prediction and decision pipeline
#[derive(Clone)]
pub struct StructuredLogger {
    service_name: String,
}

impl StructuredLogger {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn log_prediction(&self, prediction: &FailurePrediction) {
        info!(
            event = "prediction_generated",
            service = %self.service_name,
            component_id = %prediction.component_id,
            vehicle_id = %prediction.vehicle_id,
            failure_probability = prediction.failure_probability.value(),
            model_version = %prediction.model_version,
            "Failure probability computed"
        );
    }

    pub fn log_decision(&self, decision: &MaintenanceDecision) {
        info!(
            event = "maintenance_decided",
            service = %self.service_name,
            component_id = %decision.component_id,
            vehicle_id = %decision.vehicle_id,
            failure_probability = decision.failure_probability.value(),
            action = %decision.action,
            rule = ?decision.rule,
            expected_failure_cost = decision.expected_failure_cost,
            explanation = %decision.explanation,
            "Maintenance decision made"
        );
    }

    pub fn log_startup(&self, version: &str, model_version: Option<&str>) {
        info!(
            event = "service_started",
            service = %self.service_name,
            service_version = %version,
            model_version = ?model_version,
            "Maintenance service started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service_name,
            reason = %reason,
            "Maintenance service shutting down"
        );
    }
}
