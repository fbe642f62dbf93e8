//! Offline training and scoring

use crate::output::{
    color_probability, format_probability, print_info, print_json, print_success, print_table,
    OutputFormat,
};
use anyhow::{Context, Result};
use maintenance_lib::{
    batch::{predict_all, top_risks, train_from_path},
    ingest::read_readings,
    predictor::TrainingReport,
    DefaultClassifier, ProbabilisticClassifier, TrainableClassifier, TrainingConfig,
};
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

#[derive(Tabled, Serialize)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn report_rows(report: &TrainingReport) -> Vec<MetricRow> {
    let row = |metric: &str, value: String| MetricRow {
        metric: metric.to_string(),
        value,
    };
    let h = &report.holdout;
    vec![
        row("Model version", report.model_version.clone()),
        row("Train samples", report.train_samples.to_string()),
        row("Holdout samples", report.holdout_samples.to_string()),
        row("Positive rate", format!("{:.3}", report.positive_rate)),
        row("Precision", format!("{:.3}", h.precision)),
        row("Recall", format!("{:.3}", h.recall)),
        row("F1", format!("{:.3}", h.f1)),
        row("Accuracy", format!("{:.3}", h.accuracy)),
        row(
            "Confusion (tp/fp/tn/fn)",
            format!(
                "{}/{}/{}/{}",
                h.true_positives, h.false_positives, h.true_negatives, h.false_negatives
            ),
        ),
    ]
}

/// Train on an NDJSON corpus and save the artifact. Nothing is written when
/// training fails.
pub fn train(
    data: &Path,
    model_path: &Path,
    seed: u64,
    holdout: f64,
    format: OutputFormat,
) -> Result<()> {
    let config = TrainingConfig {
        holdout_fraction: holdout,
        seed,
        ..Default::default()
    };

    let outcome = train_from_path::<DefaultClassifier>(data, &config)
        .with_context(|| format!("Training on {} failed", data.display()))?;
    let version = outcome
        .model
        .save(model_path)
        .with_context(|| format!("Failed to save model to {}", model_path.display()))?;

    match format {
        OutputFormat::Json => print_json(&outcome.report),
        OutputFormat::Table => {
            print_table(&report_rows(&outcome.report), format);
            print_success(&format!("Saved model {} to {}", version, model_path.display()));
        }
    }

    Ok(())
}

#[derive(Tabled, Serialize)]
struct PredictionRow {
    #[tabled(rename = "Component")]
    component_id: String,
    #[tabled(rename = "Vehicle")]
    vehicle_id: String,
    #[tabled(rename = "Failure Probability")]
    probability: String,
}

/// Score a telemetry file with a saved model
pub fn predict(
    data: &Path,
    model_path: &Path,
    top: Option<usize>,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let model = DefaultClassifier::load(model_path)
        .with_context(|| format!("Failed to load model {}", model_path.display()))?;
    let readings =
        read_readings(data).with_context(|| format!("Failed to read {}", data.display()))?;

    let mut predictions = predict_all(&model, &readings)?;
    if let Some(n) = top {
        predictions = top_risks(&predictions, n);
    }

    if let Some(path) = output {
        maintenance_lib::ingest::write_ndjson(path, &predictions)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        print_success(&format!(
            "Wrote {} predictions to {}",
            predictions.len(),
            path.display()
        ));
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_json(&predictions),
        OutputFormat::Table => {
            let rows: Vec<PredictionRow> = predictions
                .iter()
                .map(|p| PredictionRow {
                    component_id: p.component_id.clone(),
                    vehicle_id: p.vehicle_id.clone(),
                    probability: color_probability(p.failure_probability),
                })
                .collect();
            print_table(&rows, format);
            if let Some(highest) = top_risks(&predictions, 1).first() {
                print_info(&format!(
                    "Model {}; highest risk {} at {}",
                    model.model_version(),
                    highest.component_id,
                    format_probability(highest.failure_probability)
                ));
            }
        }
    }

    Ok(())
}
