//! Configuration management for the CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// CLI configuration, read from `~/.config/pmctl/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// API endpoint URL
    pub api_url: Option<String>,
    /// Model artifact used by offline commands
    pub model_path: Option<PathBuf>,
    /// Cost document used by `decide`
    pub cost_model_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file; a missing file is an empty config
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &std::path::Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path).context("Failed to read config file")?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// Flag (or env) first, then the config file, then the default
    pub fn resolve_api_url(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn resolve_model_path(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.model_path.clone())
            .unwrap_or_else(|| PathBuf::from("model/failure_predictor.json"))
    }

    pub fn resolve_cost_model_path(&self, flag: Option<PathBuf>) -> Option<PathBuf> {
        flag.or_else(|| self.cost_model_path.clone())
    }

    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("pmctl").join("config.json"))
    }
}
