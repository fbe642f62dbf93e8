//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use maintenance_lib::{MaintenanceAction, Probability};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a table from a list of items
pub fn print_table<T: Tabled + Serialize>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("{}", "No items found".yellow());
                return;
            }
            let table = Table::new(items).with(Style::rounded()).to_string();
            println!("{}", table);
        }
        OutputFormat::Json => print_json(&items),
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    if let Ok(json) = serde_json::to_string_pretty(value) {
        println!("{}", json);
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a probability as a percentage
pub fn format_probability(p: Probability) -> String {
    format!("{:.1}%", p.value() * 100.0)
}

/// Format a cost amount
pub fn format_cost(amount: f64) -> String {
    format!("{:.2}", amount)
}

/// Color a probability by risk band
pub fn color_probability(p: Probability) -> String {
    let formatted = format_probability(p);
    if p.value() >= 0.6 {
        formatted.red().to_string()
    } else if p.value() >= 0.3 {
        formatted.yellow().to_string()
    } else {
        formatted.green().to_string()
    }
}

pub fn color_action(action: MaintenanceAction) -> String {
    match action {
        MaintenanceAction::FixNow => action.as_str().red().bold().to_string(),
        MaintenanceAction::Wait => action.as_str().green().to_string(),
    }
}

/// Color status based on value
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "healthy" => status.green().to_string(),
        "degraded" => status.yellow().to_string(),
        "unhealthy" => status.red().to_string(),
        _ => status.to_string(),
    }
}
