//! Holder for the model currently serving predictions
//!
//! Requests clone the `Arc` out of the lock and score without holding it, so
//! a reload never blocks in-flight predictions and never exposes a partly
//! loaded model.

use super::{ProbabilisticClassifier, TrainableClassifier};
use crate::error::{ArtifactError, ModelUnavailableError};
use crate::models::{FeatureVector, Probability};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error, info};

type SharedModel = Arc<dyn ProbabilisticClassifier>;

#[derive(Default)]
struct Slots {
    current: Option<SharedModel>,
    previous: Option<SharedModel>,
}

/// Versions on either side of a model swap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSwap {
    pub model_version: String,
    pub previous_version: Option<String>,
}

#[derive(Default)]
pub struct ModelRegistry {
    slots: RwLock<Slots>,
}

impl ModelRegistry {
    /// Empty registry; every prediction fails until a model is installed
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(model: impl ProbabilisticClassifier + 'static) -> Self {
        let registry = Self::new();
        registry.replace(Arc::new(model));
        registry
    }

    fn read(&self) -> RwLockReadGuard<'_, Slots> {
        self.slots.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slots> {
        self.slots.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn current(&self) -> Option<SharedModel> {
        self.read().current.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.read().current.is_some()
    }

    pub fn model_version(&self) -> Option<String> {
        self.current().map(|m| m.model_version().to_string())
    }

    /// Score with the current model, returning the version that produced it
    pub fn predict(
        &self,
        features: &FeatureVector,
    ) -> Result<(Probability, String), ModelUnavailableError> {
        let model = self.current().ok_or(ModelUnavailableError)?;
        Ok((model.predict_proba(features), model.model_version().to_string()))
    }

    /// Install a new model, keeping the old one for [`Self::rollback`]
    pub fn replace(&self, model: SharedModel) -> ModelSwap {
        let model_version = model.model_version().to_string();
        let mut slots = self.write();
        slots.previous = slots.current.replace(model);
        let previous_version = slots.previous.as_ref().map(|m| m.model_version().to_string());
        drop(slots);
        debug!(version = %model_version, "Model installed");
        ModelSwap {
            model_version,
            previous_version,
        }
    }

    /// Load an artifact and swap it in. On failure the serving model is
    /// left untouched.
    pub fn load_artifact<M>(&self, path: &Path) -> Result<ModelSwap, ArtifactError>
    where
        M: TrainableClassifier + 'static,
    {
        match M::load(path) {
            Ok(model) => {
                let swap = self.replace(Arc::new(model));
                info!(
                    event = "model_loaded",
                    model_version = %swap.model_version,
                    path = %path.display(),
                    "Failure model loaded"
                );
                Ok(swap)
            }
            Err(e) => {
                error!(
                    event = "model_load_failed",
                    path = %path.display(),
                    error = %e,
                    serving = ?self.model_version(),
                    "Failed to load failure model"
                );
                Err(e)
            }
        }
    }

    /// Swap back to the previously installed model. The displaced model
    /// becomes the new rollback target, so two rollbacks undo each other.
    pub fn rollback(&self) -> Option<ModelSwap> {
        let mut slots = self.write();
        let restored = slots.previous.take()?;
        let model_version = restored.model_version().to_string();
        slots.previous = slots.current.replace(restored);
        let previous_version = slots.previous.as_ref().map(|m| m.model_version().to_string());
        drop(slots);
        info!(
            event = "model_rolled_back",
            model_version = %model_version,
            previous_version = ?previous_version,
            "Rolled back failure model"
        );
        Some(ModelSwap {
            model_version,
            previous_version,
        })
    }
}
