//! Failure prediction engine

mod artifact;
mod features;
mod logistic;
mod metrics;
mod model;
mod registry;
mod scaler;
pub(crate) mod training;

pub use artifact::{model_version, ModelArtifact, ModelParams, ALGORITHM, ARTIFACT_FORMAT_VERSION};
pub use features::FeatureExtractor;
pub use logistic::{sigmoid, LogisticRegression, LogisticRegressionConfig};
pub use metrics::ClassificationReport;
pub use model::LogisticFailureModel;
pub use registry::{ModelRegistry, ModelSwap};
pub use scaler::StandardScaler;
pub use training::{
    holdout_split, weak_label, LabeledSample, TrainingConfig, TrainingOutcome, TrainingReport,
    FAILURE_TEMPERATURE_C, FAILURE_VIBRATION_LEVEL, MIN_TRAINING_SAMPLES,
};

use crate::error::{ArtifactError, TrainingDataError};
use crate::models::{FeatureVector, Probability};
use std::path::Path;

/// Classifier used by the service and the CLI
pub type DefaultClassifier = LogisticFailureModel;

/// A fitted model that maps features to a failure probability
pub trait ProbabilisticClassifier: Send + Sync {
    /// Pure for a fixed model; the result is always within [0, 1]
    fn predict_proba(&self, features: &FeatureVector) -> Probability;

    fn model_version(&self) -> &str;

    /// Persist the model, returning the saved version
    fn save(&self, path: &Path) -> Result<String, ArtifactError>;
}

/// A classifier that can be fit from labelled samples and loaded from disk
pub trait TrainableClassifier: ProbabilisticClassifier + Sized {
    fn train(
        samples: &[LabeledSample],
        config: &TrainingConfig,
    ) -> Result<TrainingOutcome<Self>, TrainingDataError>;

    fn load(path: &Path) -> Result<Self, ArtifactError>;
}
