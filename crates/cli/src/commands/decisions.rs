//! Maintenance decisions, offline and through the server

use crate::client::ApiClient;
use crate::output::{
    color_action, color_probability, format_cost, print_info, print_json, print_success,
    print_table, OutputFormat,
};
use anyhow::{Context, Result};
use maintenance_lib::{
    batch::{decide_job, write_decisions_csv, DecisionBreakdown},
    ingest::{read_raw, read_readings},
    CostModel, DefaultClassifier, MaintenanceDecision, SensorReading, TrainableClassifier,
};
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

#[derive(Tabled, Serialize)]
struct DecisionRow {
    #[tabled(rename = "Component")]
    component_id: String,
    #[tabled(rename = "Vehicle")]
    vehicle_id: String,
    #[tabled(rename = "Probability")]
    probability: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Expected Cost")]
    expected_cost: String,
    #[tabled(rename = "Explanation")]
    explanation: String,
}

impl From<&MaintenanceDecision> for DecisionRow {
    fn from(d: &MaintenanceDecision) -> Self {
        Self {
            component_id: d.component_id.clone(),
            vehicle_id: d.vehicle_id.clone(),
            probability: color_probability(d.failure_probability),
            action: color_action(d.action),
            expected_cost: format_cost(d.expected_failure_cost),
            explanation: d.explanation.clone(),
        }
    }
}

fn print_decisions(decisions: &[MaintenanceDecision], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(decisions),
        OutputFormat::Table => {
            let rows: Vec<DecisionRow> = decisions.iter().map(DecisionRow::from).collect();
            print_table(&rows, format);
        }
    }
}

fn print_breakdown(breakdown: &DecisionBreakdown) {
    print_info(&format!(
        "{} decisions: {} FIX_NOW, {} WAIT ({:.1}% fix now)",
        breakdown.total(),
        breakdown.fix_now,
        breakdown.wait,
        breakdown.fix_now_ratio() * 100.0
    ));
}

/// Score and decide a telemetry file offline. The CSV is only written once
/// every reading has a decision.
pub fn decide(
    data: &Path,
    model_path: &Path,
    cost_path: Option<&Path>,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let cost = match cost_path {
        Some(path) => CostModel::from_path(path)
            .with_context(|| format!("Invalid cost model {}", path.display()))?,
        None => CostModel::default(),
    };
    let model = DefaultClassifier::load(model_path)
        .with_context(|| format!("Failed to load model {}", model_path.display()))?;
    let readings =
        read_readings(data).with_context(|| format!("Failed to read {}", data.display()))?;

    let decisions = decide_job(&model, &readings, &cost)?;
    let breakdown = DecisionBreakdown::from_decisions(&decisions);

    if let Some(path) = output {
        write_decisions_csv(path, &decisions)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        print_success(&format!(
            "Wrote {} decisions to {}",
            decisions.len(),
            path.display()
        ));
    } else {
        print_decisions(&decisions, format);
    }

    if let OutputFormat::Table = format {
        print_breakdown(&breakdown);
    }

    Ok(())
}

/// Send every reading in an NDJSON file to `/recommend-maintenance`
pub async fn recommend(client: &ApiClient, file: &Path, format: OutputFormat) -> Result<()> {
    let mut readings: Vec<SensorReading> = Vec::new();
    for (line, record) in read_raw(file).with_context(|| format!("Failed to read {}", file.display()))? {
        let raw = record.with_context(|| format!("line {}: malformed JSON", line))?;
        let reading = SensorReading::try_from(raw).with_context(|| format!("line {}", line))?;
        readings.push(reading);
    }

    let mut decisions = Vec::with_capacity(readings.len());
    for reading in &readings {
        decisions.push(client.recommend(reading).await?);
    }

    print_decisions(&decisions, format);
    if let OutputFormat::Table = format {
        print_breakdown(&DecisionBreakdown::from_decisions(&decisions));
    }

    Ok(())
}
