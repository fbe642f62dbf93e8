//! On-disk model artifact
//!
//! A single JSON document holding the fitted scaler and classifier, the
//! feature contract they were trained against, and a SHA-256 checksum of
//! the parameters. Writes go through a temp file and a rename so readers
//! never see a half-written artifact.

use super::logistic::LogisticRegression;
use super::metrics::ClassificationReport;
use super::scaler::StandardScaler;
use crate::error::ArtifactError;
use crate::models::FEATURE_NAMES;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

pub const ALGORITHM: &str = "standard_scaler+logistic_regression";

/// Fitted parameters covered by the checksum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub scaler: StandardScaler,
    pub classifier: LogisticRegression,
}

impl ModelParams {
    /// SHA-256 over the little-endian bytes of every parameter
    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();
        let values = self
            .scaler
            .mean
            .iter()
            .chain(self.scaler.scale.iter())
            .chain(std::iter::once(&self.classifier.intercept))
            .chain(self.classifier.weights.iter());
        for v in values {
            hasher.update(v.to_le_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub model_version: String,
    pub algorithm: String,
    pub feature_names: Vec<String>,
    pub trained_at: DateTime<Utc>,
    pub params: ModelParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holdout: Option<ClassificationReport>,
    pub checksum: String,
}

impl ModelArtifact {
    /// Reject artifacts this build cannot serve faithfully
    pub fn verify(&self) -> Result<(), ArtifactError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedFormat(self.format_version));
        }

        let expected: Vec<String> = FEATURE_NAMES.iter().map(|s| s.to_string()).collect();
        if self.feature_names != expected {
            return Err(ArtifactError::FeatureMismatch {
                expected,
                found: self.feature_names.clone(),
            });
        }

        let computed = self.params.checksum();
        if computed != self.checksum {
            return Err(ArtifactError::ChecksumMismatch {
                expected: self.checksum.clone(),
                computed,
            });
        }
        Ok(())
    }

    pub fn write(&self, path: &Path) -> Result<(), ArtifactError> {
        let io_err = |source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let bytes = serde_json::to_vec_pretty(self)?;
        let temp_path = path.with_extension("tmp");
        let mut file = File::create(&temp_path).map_err(io_err)?;
        file.write_all(&bytes).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        fs::rename(&temp_path, path).map_err(io_err)?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self, ArtifactError> {
        let bytes = fs::read(path).map_err(|source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let artifact: Self = serde_json::from_slice(&bytes)?;
        artifact.verify()?;
        Ok(artifact)
    }
}

/// `v<trained_at>-<checksum prefix>`
pub fn model_version(trained_at: &DateTime<Utc>, checksum: &str) -> String {
    let short = checksum.get(..8).unwrap_or(checksum);
    format!("v{}-{}", trained_at.format("%Y%m%d%H%M%S"), short)
}
