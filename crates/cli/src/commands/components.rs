//! Component status and server administration

use crate::client::ApiClient;
use crate::output::{
    color_action, color_status, print_info, print_json, print_success, print_table,
    print_warning, OutputFormat,
};
use anyhow::Result;
use maintenance_lib::{ComponentStatus, ModelSwap};
use serde::Serialize;
use tabled::Tabled;

#[derive(Tabled, Serialize)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    component_id: String,
    #[tabled(rename = "Vehicle")]
    vehicle_id: String,
}

#[derive(Tabled, Serialize)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// List every known component
pub async fn list_components(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let components = client.components().await?;

    let rows: Vec<ComponentRow> = components
        .into_iter()
        .map(|c| ComponentRow {
            component_id: c.component_id,
            vehicle_id: c.vehicle_id,
        })
        .collect();
    print_table(&rows, format);

    Ok(())
}

/// Show the latest reading and decision for one component
pub async fn component_status(
    client: &ApiClient,
    component_id: &str,
    format: OutputFormat,
) -> Result<()> {
    let record = client.component_status(component_id).await?;

    if let OutputFormat::Json = format {
        print_json(&record);
        return Ok(());
    }

    let reading = &record.reading;
    let field = |field: &str, value: String| FieldRow {
        field: field.to_string(),
        value,
    };
    let mut rows = vec![
        field("Component", record.component_id.clone()),
        field("Vehicle", record.vehicle_id.clone()),
        field("Timestamp", reading.timestamp.to_string()),
        field(
            "Battery",
            format!(
                "{:.1} °C, {:.2} V, {}",
                reading.battery.temperature, reading.battery.voltage, reading.battery.error_code
            ),
        ),
        field(
            "Motor",
            format!(
                "vibration {:.2}, torque {:.1}, {}",
                reading.motor.vibration_level, reading.motor.torque, reading.motor.error_code
            ),
        ),
        field(
            "Brakes",
            format!(
                "pad {:.2}, {:.1} °C, {}",
                reading.brake.pad_thickness,
                reading.brake.temperature,
                reading.brake.error_code
            ),
        ),
        field("Updated", record.updated_at.to_rfc3339()),
    ];
    match &record.last_decision {
        Some(decision) => {
            rows.push(field("Decision", color_action(decision.action)));
            rows.push(field("Explanation", decision.explanation.clone()));
        }
        None => rows.push(field("Decision", "-".to_string())),
    }
    print_table(&rows, format);

    Ok(())
}

fn print_swap(swap: &ModelSwap, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(swap),
        OutputFormat::Table => {
            print_success(&format!("Serving model {}", swap.model_version));
            match &swap.previous_version {
                Some(previous) => print_info(&format!("Replaced {}", previous)),
                None => print_info("No model was loaded before"),
            }
        }
    }
}

/// Ask the server to reload its model artifact
pub async fn reload_model(client: &ApiClient, format: OutputFormat) -> Result<()> {
    print_swap(&client.reload_model().await?, format);
    Ok(())
}

pub async fn rollback_model(client: &ApiClient, format: OutputFormat) -> Result<()> {
    print_swap(&client.rollback_model().await?, format);
    Ok(())
}

#[derive(Tabled, Serialize)]
struct HealthRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
}

fn status_label(status: ComponentStatus) -> &'static str {
    match status {
        ComponentStatus::Healthy => "healthy",
        ComponentStatus::Degraded => "degraded",
        ComponentStatus::Unhealthy => "unhealthy",
    }
}

/// Show server health per component
pub async fn health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health = client.health().await?;

    if let OutputFormat::Json = format {
        print_json(&health);
        return Ok(());
    }

    let mut rows: Vec<HealthRow> = health
        .components
        .iter()
        .map(|(name, c)| HealthRow {
            name: name.clone(),
            status: color_status(status_label(c.status)),
            message: c.message.clone().unwrap_or_default(),
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    print_table(&rows, format);

    match health.status {
        ComponentStatus::Healthy => print_success("Service healthy"),
        ComponentStatus::Degraded => print_warning("Service degraded"),
        ComponentStatus::Unhealthy => print_warning("Service unhealthy"),
    }

    Ok(())
}
