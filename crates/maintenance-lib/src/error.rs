//! Error taxonomy for the maintenance pipeline
//!
//! Per-request errors ([`ValidationError`], [`ModelUnavailableError`]) are
//! surfaced to the caller and never take the service down. Job-level errors
//! ([`ConfigError`], [`TrainingDataError`]) abort the whole batch operation
//! before anything is committed.

use thiserror::Error;

/// A sensor reading (or a value derived from one) is malformed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(String),

    #[error("field `{field}` must be a finite number, got {value}")]
    NonFinite { field: String, value: f64 },

    #[error("field `{field}` is invalid: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("field `{field}` has unknown error code `{code}`")]
    UnknownErrorCode { field: String, code: String },

    #[error("probability {0} is outside [0, 1]")]
    ProbabilityOutOfRange(f64),

    #[error("malformed reading: {0}")]
    Malformed(String),
}

impl ValidationError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Dotted name of the offending field, when there is one
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField(field)
            | Self::NonFinite { field, .. }
            | Self::InvalidField { field, .. }
            | Self::UnknownErrorCode { field, .. } => Some(field),
            Self::ProbabilityOutOfRange(_) | Self::Malformed(_) => None,
        }
    }
}

/// Inference was requested while no model is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no failure model is loaded")]
pub struct ModelUnavailableError;

/// Cost configuration rejected at load time
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("`{field}` must be greater than zero, got {value}")]
    NonPositiveCost { field: &'static str, value: f64 },

    #[error("`threshold` must be within [0, 1], got {0}")]
    ThresholdOutOfRange(f64),

    #[error("failed to load cost configuration: {0}")]
    Load(String),
}

/// The training corpus cannot produce a model
#[derive(Debug, Error)]
pub enum TrainingDataError {
    #[error("record {line} is missing required column `{column}`")]
    MissingColumn { column: String, line: usize },

    #[error("record {line} is invalid: {reason}")]
    InvalidRecord { line: usize, reason: String },

    #[error("need at least {required} samples to train, got {found}")]
    TooFewSamples { found: usize, required: usize },

    #[error("training partition only contains label {label}; both classes are required")]
    SingleClass { label: u8 },

    #[error("holdout fraction must be within (0, 1), got {0}")]
    InvalidHoldout(f64),

    #[error("solver failed: {0}")]
    Solver(String),

    #[error("failed to read training corpus: {0}")]
    Io(#[from] std::io::Error),
}

/// Model artifact could not be written or read back
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unsupported artifact format version {0}")]
    UnsupportedFormat(u32),

    #[error("artifact features {found:?} do not match expected {expected:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("artifact checksum mismatch: expected {expected}, computed {computed}")]
    ChecksumMismatch { expected: String, computed: String },
}

/// A telemetry file could not be ingested
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read telemetry: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {source}")]
    Record {
        line: usize,
        #[source]
        source: ValidationError,
    },
}

/// A batch result could not be exported
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Component status store failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("component store unavailable: {0}")]
    Unavailable(String),
}

/// Errors a single Predict/Recommend request can produce
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    ModelUnavailable(#[from] ModelUnavailableError),
}
