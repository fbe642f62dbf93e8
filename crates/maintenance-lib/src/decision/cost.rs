//! Business cost parameters for the maintenance decision

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_COST_FAILURE: f64 = 5000.0;
pub const DEFAULT_COST_FIX: f64 = 1000.0;
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// Validated cost configuration. Construction is the only place the domain
/// is checked; a `CostModel` in hand is always usable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CostModelDocument", into = "CostModelDocument")]
pub struct CostModel {
    cost_failure: f64,
    cost_fix: f64,
    threshold: f64,
}

/// On-disk shape of the cost configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CostModelDocument {
    #[serde(default = "default_cost_failure")]
    pub cost_failure: f64,
    #[serde(default = "default_cost_fix", alias = "cost_fix")]
    pub early_fix_cost: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_cost_failure() -> f64 {
    DEFAULT_COST_FAILURE
}

fn default_cost_fix() -> f64 {
    DEFAULT_COST_FIX
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            cost_failure: DEFAULT_COST_FAILURE,
            cost_fix: DEFAULT_COST_FIX,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl CostModel {
    pub fn new(cost_failure: f64, cost_fix: f64, threshold: f64) -> Result<Self, ConfigError> {
        if !(cost_failure.is_finite() && cost_failure > 0.0) {
            return Err(ConfigError::NonPositiveCost {
                field: "cost_failure",
                value: cost_failure,
            });
        }
        if !(cost_fix.is_finite() && cost_fix > 0.0) {
            return Err(ConfigError::NonPositiveCost {
                field: "early_fix_cost",
                value: cost_fix,
            });
        }
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::ThresholdOutOfRange(threshold));
        }
        Ok(Self {
            cost_failure,
            cost_fix,
            threshold,
        })
    }

    /// Load a JSON cost document. Keys absent from the file take the
    /// defaults; present but out-of-domain values are rejected.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let load_error = |e: &dyn std::fmt::Display| ConfigError::Load(format!("{}: {}", path.display(), e));
        let file = File::open(path).map_err(|e| load_error(&e))?;
        let document: CostModelDocument =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| load_error(&e))?;

        let model = Self::try_from(document)?;
        debug!(
            path = %path.display(),
            cost_failure = model.cost_failure,
            cost_fix = model.cost_fix,
            threshold = model.threshold,
            "Cost model loaded"
        );
        Ok(model)
    }

    /// Cost incurred if the component fails in service
    pub fn cost_failure(&self) -> f64 {
        self.cost_failure
    }

    /// Cost of fixing the component now
    pub fn cost_fix(&self) -> f64 {
        self.cost_fix
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl TryFrom<CostModelDocument> for CostModel {
    type Error = ConfigError;

    fn try_from(doc: CostModelDocument) -> Result<Self, Self::Error> {
        Self::new(doc.cost_failure, doc.early_fix_cost, doc.threshold)
    }
}

impl From<CostModel> for CostModelDocument {
    fn from(model: CostModel) -> Self {
        Self {
            cost_failure: model.cost_failure,
            early_fix_cost: model.cost_fix,
            threshold: model.threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("cost_model.json");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_domain_checks() {
        assert!(CostModel::new(5000.0, 1000.0, 0.6).is_ok());
        assert!(CostModel::new(5000.0, 1000.0, 0.0).is_ok());
        assert!(CostModel::new(5000.0, 1000.0, 1.0).is_ok());
        assert_eq!(
            CostModel::new(0.0, 1000.0, 0.6),
            Err(ConfigError::NonPositiveCost { field: "cost_failure", value: 0.0 })
        );
        assert!(matches!(
            CostModel::new(5000.0, -1.0, 0.6),
            Err(ConfigError::NonPositiveCost { field: "early_fix_cost", .. })
        ));
        assert_eq!(CostModel::new(5000.0, 1000.0, 1.2), Err(ConfigError::ThresholdOutOfRange(1.2)));
        assert!(CostModel::new(5000.0, 1000.0, f64::NAN).is_err());
        assert!(CostModel::new(f64::INFINITY, 1000.0, 0.5).is_err());
    }

    #[test]
    fn test_load_full_document() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, r#"{"cost_failure": 8000, "early_fix_cost": 1500, "threshold": 0.7}"#);
        let model = CostModel::from_path(&path).unwrap();
        assert_eq!(model.cost_failure(), 8000.0);
        assert_eq!(model.cost_fix(), 1500.0);
        assert_eq!(model.threshold(), 0.7);
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, r#"{"cost_failure": 7000}"#);
        let model = CostModel::from_path(&path).unwrap();
        assert_eq!(model.cost_failure(), 7000.0);
        assert_eq!(model.cost_fix(), DEFAULT_COST_FIX);
        assert_eq!(model.threshold(), DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_invalid_document_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, r#"{"cost_failure": -5}"#);
        assert!(matches!(
            CostModel::from_path(&path),
            Err(ConfigError::NonPositiveCost { field: "cost_failure", .. })
        ));

        let missing = dir.path().join("absent.json");
        assert!(matches!(CostModel::from_path(&missing), Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_mistyped_values_are_rejected() {
        let dir = TempDir::new().unwrap();
        for body in [
            r#"{"early_fix_cost": true}"#,
            r#"{"cost_failure": "7000"}"#,
            r#"{"threshold": "0.5"}"#,
        ] {
            let path = write(&dir, body);
            assert!(
                matches!(CostModel::from_path(&path), Err(ConfigError::Load(_))),
                "{} should not load",
                body
            );
        }
    }

    #[test]
    fn test_serde_validates() {
        let model: CostModel = serde_json::from_str(r#"{"cost_fix": 900}"#).unwrap();
        assert_eq!(model.cost_fix(), 900.0);
        assert!(serde_json::from_str::<CostModel>(r#"{"threshold": 2.0}"#).is_err());

        let json = serde_json::to_value(CostModel::default()).unwrap();
        assert_eq!(json["early_fix_cost"], 1000.0);
    }
}
