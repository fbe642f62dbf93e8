//! Standardised logistic regression failure model

use super::artifact::{self, ModelArtifact, ModelParams, ALGORITHM, ARTIFACT_FORMAT_VERSION};
use super::logistic::LogisticRegression;
use super::metrics::ClassificationReport;
use super::scaler::StandardScaler;
use super::training::{self, LabeledSample, TrainingConfig, TrainingOutcome};
use super::{ProbabilisticClassifier, TrainableClassifier};
use crate::error::{ArtifactError, TrainingDataError};
use crate::models::{FeatureVector, Probability, FEATURE_NAMES};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::debug;

/// Immutable once built; a new training run produces a new instance
#[derive(Debug, Clone)]
pub struct LogisticFailureModel {
    version: String,
    trained_at: DateTime<Utc>,
    params: ModelParams,
    holdout: Option<ClassificationReport>,
}

impl LogisticFailureModel {
    pub fn new(scaler: StandardScaler, classifier: LogisticRegression, trained_at: DateTime<Utc>) -> Self {
        let params = ModelParams { scaler, classifier };
        let version = artifact::model_version(&trained_at, &params.checksum());
        Self {
            version,
            trained_at,
            params,
            holdout: None,
        }
    }

    pub(crate) fn with_holdout(mut self, report: ClassificationReport) -> Self {
        self.holdout = Some(report);
        self
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.params.scaler
    }

    pub fn classifier(&self) -> &LogisticRegression {
        &self.params.classifier
    }

    pub fn holdout(&self) -> Option<&ClassificationReport> {
        self.holdout.as_ref()
    }

    pub fn to_artifact(&self) -> ModelArtifact {
        ModelArtifact {
            format_version: ARTIFACT_FORMAT_VERSION,
            model_version: self.version.clone(),
            algorithm: ALGORITHM.to_string(),
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            trained_at: self.trained_at,
            params: self.params.clone(),
            holdout: self.holdout.clone(),
            checksum: self.params.checksum(),
        }
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ArtifactError> {
        artifact.verify()?;
        Ok(Self {
            version: artifact.model_version,
            trained_at: artifact.trained_at,
            params: artifact.params,
            holdout: artifact.holdout,
        })
    }
}

impl ProbabilisticClassifier for LogisticFailureModel {
    fn predict_proba(&self, features: &FeatureVector) -> Probability {
        let z = self.params.scaler.transform(&features.to_array());
        Probability::saturating(self.params.classifier.predict_proba(&z))
    }

    fn model_version(&self) -> &str {
        &self.version
    }

    fn save(&self, path: &Path) -> Result<String, ArtifactError> {
        self.to_artifact().write(path)?;
        debug!(version = %self.version, path = %path.display(), "Model artifact written");
        Ok(self.version.clone())
    }
}

impl TrainableClassifier for LogisticFailureModel {
    fn train(
        samples: &[LabeledSample],
        config: &TrainingConfig,
    ) -> Result<TrainingOutcome<Self>, TrainingDataError> {
        training::train_logistic(samples, config)
    }

    fn load(path: &Path) -> Result<Self, ArtifactError> {
        Self::from_artifact(ModelArtifact::read(path)?)
    }
}
