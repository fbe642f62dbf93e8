//! L2-regularised binary logistic regression
//!
//! Fitting is delegated to `linfa-logistic` (L-BFGS). Only the coefficients
//! and intercept are kept, oriented so that the positive class is failure;
//! scoring a row is then a dot product and a sigmoid.

use crate::error::TrainingDataError;
use crate::models::NUM_FEATURES;
use linfa::traits::Fit;
use linfa::Dataset;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Solver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegressionConfig {
    /// L2 penalty on the weights; 1.0 matches an inverse strength of C = 1
    pub alpha: f64,
    pub max_iterations: u64,
    pub gradient_tolerance: f64,
}

impl Default for LogisticRegressionConfig {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            max_iterations: 200,
            gradient_tolerance: 1e-6,
        }
    }
}

/// Fitted parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub intercept: f64,
    pub weights: [f64; NUM_FEATURES],
}

impl LogisticRegression {
    /// Fit on already-standardised records. `labels[i]` is true for failure.
    pub fn fit(
        records: Array2<f64>,
        labels: Array1<bool>,
        config: &LogisticRegressionConfig,
    ) -> Result<Self, TrainingDataError> {
        if records.ncols() != NUM_FEATURES {
            return Err(TrainingDataError::Solver(format!(
                "expected {} feature columns, got {}",
                NUM_FEATURES,
                records.ncols()
            )));
        }

        let dataset = Dataset::new(records, labels);
        let fitted = linfa_logistic::LogisticRegression::default()
            .alpha(config.alpha)
            .max_iterations(config.max_iterations)
            .gradient_tolerance(config.gradient_tolerance)
            .fit(&dataset)
            .map_err(|e| TrainingDataError::Solver(e.to_string()))?;

        // linfa picks which label is "positive"; flip so failure always is
        let sign = if fitted.labels().pos.class { 1.0 } else { -1.0 };
        let mut weights = [0.0; NUM_FEATURES];
        for (w, p) in weights.iter_mut().zip(fitted.params().iter()) {
            *w = sign * p;
        }

        Ok(Self {
            intercept: sign * fitted.intercept(),
            weights,
        })
    }

    pub fn decision_function(&self, row: &[f64; NUM_FEATURES]) -> f64 {
        self.intercept + self.weights.iter().zip(row).map(|(w, x)| w * x).sum::<f64>()
    }

    /// Probability of the failure class
    pub fn predict_proba(&self, row: &[f64; NUM_FEATURES]) -> f64 {
        sigmoid(self.decision_function(row))
    }
}

/// Numerically stable logistic function
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlapping_data() -> (Array2<f64>, Array1<bool>) {
        // Label depends mostly on the first feature, with some noise so the
        // optimum is finite even without regularisation.
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..200 {
            let x0 = (i as f64 - 100.0) / 50.0;
            let x1 = ((i * 37) % 17) as f64 / 17.0 - 0.5;
            let x2 = if i % 3 == 0 { 1.0 } else { -0.5 };
            rows.push([x0, x1, x2]);
            labels.push(x0 + 0.3 * x1 > 0.0 || i % 11 == 0);
        }
        (Array2::from(rows), Array1::from(labels))
    }

    #[test]
    fn test_sigmoid_is_stable() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_fit_separates_classes() {
        let (records, labels) = overlapping_data();
        let model = LogisticRegression::fit(records, labels, &LogisticRegressionConfig::default()).unwrap();
        assert!(model.weights[0] > 0.0);
        assert!(model.predict_proba(&[2.0, 0.0, 0.0]) > 0.9);
        assert!(model.predict_proba(&[-2.0, 0.0, 0.0]) < 0.1);
    }

    #[test]
    fn test_orientation_matches_linfa_probabilities() {
        let (records, labels) = overlapping_data();
        let model =
            LogisticRegression::fit(records.clone(), labels.clone(), &LogisticRegressionConfig::default()).unwrap();

        let fitted = linfa_logistic::LogisticRegression::default()
            .alpha(1.0)
            .max_iterations(200)
            .gradient_tolerance(1e-6)
            .fit(&Dataset::new(records.clone(), labels))
            .unwrap();
        let positive = fitted.predict_probabilities(&records);
        let failure_is_positive = fitted.labels().pos.class;

        for (row, p) in records.rows().into_iter().zip(positive.iter()) {
            let row = [row[0], row[1], row[2]];
            let expected = if failure_is_positive { *p } else { 1.0 - p };
            assert!((model.predict_proba(&row) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_regularisation_shrinks_weights() {
        let (records, labels) = overlapping_data();
        let loose =
            LogisticRegression::fit(records.clone(), labels.clone(), &LogisticRegressionConfig::default()).unwrap();
        let tight = LogisticRegression::fit(
            records,
            labels,
            &LogisticRegressionConfig {
                alpha: 100.0,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(tight.weights[0].abs() < loose.weights[0].abs());
    }

    #[test]
    fn test_rejects_wrong_width() {
        let records = Array2::from(vec![[0.0, 1.0], [1.0, 0.0]]);
        let labels = Array1::from(vec![true, false]);
        assert!(matches!(
            LogisticRegression::fit(records, labels, &LogisticRegressionConfig::default()),
            Err(TrainingDataError::Solver(_))
        ));
    }
}
