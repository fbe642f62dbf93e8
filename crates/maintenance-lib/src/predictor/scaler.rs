//! Per-feature standardisation fit on the training partition

use crate::models::NUM_FEATURES;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Zero-mean, unit-variance scaling (population standard deviation)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: [f64; NUM_FEATURES],
    pub scale: [f64; NUM_FEATURES],
}

impl StandardScaler {
    /// Constant columns keep a scale of 1 so they transform to zero.
    pub fn fit(records: &Array2<f64>) -> Self {
        let mut mean = [0.0; NUM_FEATURES];
        let mut scale = [1.0; NUM_FEATURES];
        let Some(column_means) = records.mean_axis(Axis(0)) else {
            return Self { mean, scale };
        };
        let column_stds = records.std_axis(Axis(0), 0.0);

        for (j, (m, s)) in column_means.iter().zip(column_stds.iter()).take(NUM_FEATURES).enumerate() {
            mean[j] = *m;
            if *s > f64::EPSILON {
                scale[j] = *s;
            }
        }
        Self { mean, scale }
    }

    pub fn transform(&self, row: &[f64; NUM_FEATURES]) -> [f64; NUM_FEATURES] {
        let mut out = [0.0; NUM_FEATURES];
        for j in 0..NUM_FEATURES {
            out[j] = (row[j] - self.mean[j]) / self.scale[j];
        }
        out
    }

    /// Standardise every row of `records`
    pub fn transform_records(&self, records: &Array2<f64>) -> Array2<f64> {
        let mean = Array1::from(self.mean.to_vec());
        let scale = Array1::from(self.scale.to_vec());
        (records - &mean) / &scale
    }
}
