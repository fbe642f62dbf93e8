//! Offline training of the failure model
//!
//! Labels come from a heuristic rule rather than observed failures (weak
//! supervision). The rule overlaps with the decision engine's own inputs, so
//! the fitted model mostly smooths that heuristic into a probability.

use super::logistic::{LogisticRegression, LogisticRegressionConfig};
use super::metrics::ClassificationReport;
use super::model::LogisticFailureModel;
use super::scaler::StandardScaler;
use super::ProbabilisticClassifier;
use crate::error::TrainingDataError;
use crate::models::{FeatureVector, NUM_FEATURES};
use chrono::Utc;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Battery temperature (°C) above which a reading counts toward failure
pub const FAILURE_TEMPERATURE_C: f64 = 85.0;

/// Motor vibration level above which a reading counts toward failure
pub const FAILURE_VIBRATION_LEVEL: f64 = 1.0;

/// Minimum corpus size accepted for training
pub const MIN_TRAINING_SAMPLES: usize = 20;

/// Probability cut-off used when scoring the holdout partition
const HOLDOUT_DECISION_CUTOFF: f64 = 0.5;

/// Weak failure label: overheating with heavy vibration, or any fault code
pub fn weak_label(features: &FeatureVector) -> bool {
    (features.battery_temperature > FAILURE_TEMPERATURE_C
        && features.motor_vibration_level > FAILURE_VIBRATION_LEVEL)
        || features.has_error()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledSample {
    pub features: FeatureVector,
    pub label: bool,
}

impl LabeledSample {
    pub fn weakly_labeled(features: FeatureVector) -> Self {
        Self {
            label: weak_label(&features),
            features,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Share of samples held out for evaluation
    pub holdout_fraction: f64,
    /// Seed for the holdout shuffle
    pub seed: u64,
    pub min_samples: usize,
    pub solver: LogisticRegressionConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            holdout_fraction: 0.2,
            seed: 42,
            min_samples: MIN_TRAINING_SAMPLES,
            solver: LogisticRegressionConfig::default(),
        }
    }
}

/// Summary of a training run, for logs and CLI output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub model_version: String,
    pub train_samples: usize,
    pub holdout_samples: usize,
    /// Share of weak-positive labels in the whole corpus
    pub positive_rate: f64,
    pub holdout: ClassificationReport,
}

#[derive(Debug, Clone)]
pub struct TrainingOutcome<M> {
    pub model: M,
    pub report: TrainingReport,
}

/// Seeded shuffle split into `(train, holdout)` index sets. The holdout
/// gets `ceil(n * fraction)` samples and both sides keep at least one.
pub fn holdout_split(n: usize, fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let holdout_len = ((n as f64 * fraction).ceil() as usize).clamp(1, n.saturating_sub(1).max(1));
    let train = indices.split_off(holdout_len.min(n));
    (train, indices)
}

pub(crate) fn train_logistic(
    samples: &[LabeledSample],
    config: &TrainingConfig,
) -> Result<TrainingOutcome<LogisticFailureModel>, TrainingDataError> {
    let required = config.min_samples.max(2);
    if samples.len() < required {
        return Err(TrainingDataError::TooFewSamples {
            found: samples.len(),
            required,
        });
    }
    if !(config.holdout_fraction > 0.0 && config.holdout_fraction < 1.0) {
        return Err(TrainingDataError::InvalidHoldout(config.holdout_fraction));
    }

    let (train_idx, holdout_idx) = holdout_split(samples.len(), config.holdout_fraction, config.seed);
    let train: Vec<&LabeledSample> = train_idx.iter().map(|&i| &samples[i]).collect();
    let holdout: Vec<&LabeledSample> = holdout_idx.iter().map(|&i| &samples[i]).collect();

    let positives = train.iter().filter(|s| s.label).count();
    if positives == 0 || positives == train.len() {
        return Err(TrainingDataError::SingleClass {
            label: u8::from(positives > 0),
        });
    }

    let raw: Vec<[f64; NUM_FEATURES]> = train.iter().map(|s| s.features.to_array()).collect();
    let raw = Array2::from(raw);
    let scaler = StandardScaler::fit(&raw);
    let records = scaler.transform_records(&raw);
    let labels: Array1<bool> = train.iter().map(|s| s.label).collect();

    let classifier = LogisticRegression::fit(records, labels, &config.solver)?;

    let model = LogisticFailureModel::new(scaler, classifier, Utc::now());
    let report = ClassificationReport::from_pairs(holdout.iter().map(|s| {
        let p = model.predict_proba(&s.features).value();
        (s.label, p >= HOLDOUT_DECISION_CUTOFF)
    }));
    let model = model.with_holdout(report.clone());

    let positive_rate = samples.iter().filter(|s| s.label).count() as f64 / samples.len() as f64;
    let report = TrainingReport {
        model_version: model.model_version().to_string(),
        train_samples: train.len(),
        holdout_samples: holdout.len(),
        positive_rate,
        holdout: report,
    };

    info!(
        event = "model_trained",
        model_version = %report.model_version,
        train_samples = report.train_samples,
        holdout_samples = report.holdout_samples,
        positive_rate = report.positive_rate,
        precision = report.holdout.precision,
        recall = report.holdout.recall,
        f1 = report.holdout.f1,
        accuracy = report.holdout.accuracy,
        "Failure model trained"
    );

    Ok(TrainingOutcome { model, report })
}
