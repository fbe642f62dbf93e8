//! Server configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Loaded from `PM_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Name attached to structured log events
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// HTTP port for the API, health and metrics
    #[serde(default = "default_port")]
    pub port: u16,

    /// Model artifact loaded at start-up and on reload
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Cost document; built-in defaults when absent
    #[serde(default)]
    pub cost_model_path: Option<PathBuf>,

    /// NDJSON telemetry used to seed the component store
    #[serde(default)]
    pub seed_telemetry_path: Option<PathBuf>,
}

fn default_service_name() -> String {
    "maintenance-server".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_model_path() -> PathBuf {
    PathBuf::from("model/failure_predictor.json")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            port: default_port(),
            model_path: default_model_path(),
            cost_model_path: None,
            seed_telemetry_path: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        Self::from_source(config::Environment::with_prefix("PM"))
    }

    fn from_source(source: config::Environment) -> Result<Self> {
        config::Config::builder()
            .add_source(source)
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid server configuration")
    }
}
