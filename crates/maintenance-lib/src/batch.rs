//! Offline batch jobs: training from a telemetry corpus, bulk scoring and
//! bulk decisions
//!
//! Jobs validate everything before producing output. A single bad record
//! fails the job and nothing partial is returned.

use crate::decision::{decide_all, CostModel};
use crate::error::{ExportError, TrainingDataError, ValidationError};
use crate::ingest::read_raw;
use crate::models::{FailurePrediction, MaintenanceAction, MaintenanceDecision, SensorReading};
use crate::predictor::{
    FeatureExtractor, LabeledSample, ProbabilisticClassifier, TrainableClassifier, TrainingConfig,
    TrainingOutcome,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;
use tracing::info;

/// Train from an NDJSON corpus. Only the model's columns are required;
/// the rest of each record is not validated here.
pub fn train_from_path<M: TrainableClassifier>(
    path: &Path,
    config: &TrainingConfig,
) -> Result<TrainingOutcome<M>, TrainingDataError> {
    let records = read_raw(path).map_err(|e| match e {
        crate::error::IngestError::Io(io) => TrainingDataError::Io(io),
        other => TrainingDataError::InvalidRecord {
            line: 0,
            reason: other.to_string(),
        },
    })?;

    let extractor = FeatureExtractor::new();
    let mut samples = Vec::with_capacity(records.len());
    for (line, record) in records {
        let raw = record.map_err(|e| TrainingDataError::InvalidRecord {
            line,
            reason: e.to_string(),
        })?;
        let features = extractor.extract_raw(&raw).map_err(|e| match e {
            ValidationError::MissingField(column) => TrainingDataError::MissingColumn { column, line },
            other => TrainingDataError::InvalidRecord {
                line,
                reason: other.to_string(),
            },
        })?;
        samples.push(LabeledSample::weakly_labeled(features));
    }

    info!(path = %path.display(), samples = samples.len(), "Training corpus loaded");
    M::train(&samples, config)
}

/// Score every reading; any reading that cannot be featurised fails the job
pub fn predict_all(
    model: &dyn ProbabilisticClassifier,
    readings: &[SensorReading],
) -> Result<Vec<FailurePrediction>, ValidationError> {
    let extractor = FeatureExtractor::new();
    readings
        .iter()
        .map(|reading| {
            let features = extractor.extract(reading)?;
            Ok(FailurePrediction {
                component_id: reading.component_id.clone(),
                vehicle_id: reading.vehicle_id.clone(),
                failure_probability: model.predict_proba(&features),
                model_version: model.model_version().to_string(),
            })
        })
        .collect()
}

/// The `n` highest-risk predictions, highest first. Ties keep input order.
pub fn top_risks(predictions: &[FailurePrediction], n: usize) -> Vec<FailurePrediction> {
    let mut ranked = predictions.to_vec();
    ranked.sort_by(|a, b| {
        b.failure_probability
            .partial_cmp(&a.failure_probability)
            .unwrap_or(Ordering::Equal)
    });
    ranked.truncate(n);
    ranked
}

/// Score and decide a batch. Either every reading gets a decision or the
/// job fails.
pub fn decide_job(
    model: &dyn ProbabilisticClassifier,
    readings: &[SensorReading],
    cost: &CostModel,
) -> Result<Vec<MaintenanceDecision>, ValidationError> {
    let predictions = predict_all(model, readings)?;
    let decisions = decide_all(&predictions, cost);
    let breakdown = DecisionBreakdown::from_decisions(&decisions);
    info!(
        total = breakdown.total(),
        fix_now = breakdown.fix_now,
        wait = breakdown.wait,
        model_version = %model.model_version(),
        "Decision job finished"
    );
    Ok(decisions)
}

/// Count of decisions per action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionBreakdown {
    pub fix_now: usize,
    pub wait: usize,
}

impl DecisionBreakdown {
    pub fn from_decisions(decisions: &[MaintenanceDecision]) -> Self {
        decisions.iter().fold(Self::default(), |mut acc, d| {
            match d.action {
                MaintenanceAction::FixNow => acc.fix_now += 1,
                MaintenanceAction::Wait => acc.wait += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.fix_now + self.wait
    }

    /// Share of FIX_NOW decisions; 0 for an empty batch
    pub fn fix_now_ratio(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.fix_now as f64 / self.total() as f64
        }
    }
}

#[derive(Serialize)]
struct DecisionRow<'a> {
    component_id: &'a str,
    vehicle_id: &'a str,
    failure_probability: f64,
    action: &'static str,
    rule: crate::models::DecisionRule,
    expected_failure_cost: f64,
    explanation: &'a str,
}

/// Write decisions as CSV with a header row
pub fn write_decisions_csv(path: &Path, decisions: &[MaintenanceDecision]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for d in decisions {
        writer.serialize(DecisionRow {
            component_id: &d.component_id,
            vehicle_id: &d.vehicle_id,
            failure_probability: d.failure_probability.value(),
            action: d.action.as_str(),
            rule: d.rule,
            expected_failure_cost: d.expected_failure_cost,
            explanation: &d.explanation,
        })?;
    }
    writer.flush()?;
    Ok(())
}
