//! Holdout evaluation for the failure class

use serde::{Deserialize, Serialize};

/// Confusion counts and derived scores for the positive (failure) class.
/// Undefined ratios (no predicted or no actual positives) are reported as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub accuracy: f64,
}

impl ClassificationReport {
    /// Build from `(actual, predicted)` pairs
    pub fn from_pairs(pairs: impl IntoIterator<Item = (bool, bool)>) -> Self {
        let mut report = Self::default();
        for (actual, predicted) in pairs {
            match (actual, predicted) {
                (true, true) => report.true_positives += 1,
                (false, true) => report.false_positives += 1,
                (false, false) => report.true_negatives += 1,
                (true, false) => report.false_negatives += 1,
            }
        }

        let tp = report.true_positives as f64;
        report.precision = ratio(tp, tp + report.false_positives as f64);
        report.recall = ratio(tp, tp + report.false_negatives as f64);
        report.f1 = ratio(
            2.0 * report.precision * report.recall,
            report.precision + report.recall,
        );
        report.accuracy = ratio(
            (report.true_positives + report.true_negatives) as f64,
            report.support() as f64,
        );
        report
    }

    /// Number of evaluated samples
    pub fn support(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn positive_support(&self) -> usize {
        self.true_positives + self.false_negatives
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}
