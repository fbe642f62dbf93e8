//! Synthetic telemetry generation

use crate::output::{print_json, print_success, OutputFormat};
use anyhow::{Context, Result};
use maintenance_lib::{
    ingest::write_ndjson,
    simulation::{SimulationConfig, TelemetrySimulator},
};
use std::path::Path;

/// Generate `count` readings and write them as NDJSON, or print them when
/// no output file is given
pub fn simulate(
    count: usize,
    seed: Option<u64>,
    anomaly_rate: f64,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let config = SimulationConfig {
        anomaly_rate,
        ..Default::default()
    };
    let readings = TelemetrySimulator::new(config, seed)
        .context("Invalid simulation settings")?
        .generate(count);

    match output {
        Some(path) => {
            write_ndjson(path, &readings)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            print_success(&format!(
                "Wrote {} readings to {}",
                readings.len(),
                path.display()
            ));
        }
        None => match format {
            OutputFormat::Json => print_json(&readings),
            OutputFormat::Table => {
                for reading in &readings {
                    println!("{}", serde_json::to_string(reading)?);
                }
            }
        },
    }

    Ok(())
}
