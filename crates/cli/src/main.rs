//! Predictive maintenance CLI
//!
//! Offline commands train, score and decide over NDJSON telemetry files;
//! remote commands talk to a running maintenance server.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{components, decisions, model, simulate};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Predictive maintenance CLI
#[derive(Parser)]
#[command(name = "pmctl")]
#[command(author, version, about = "CLI for the predictive maintenance service", long_about = None)]
pub struct Cli {
    /// API endpoint URL (falls back to the config file, then http://localhost:8080)
    #[arg(long, env = "PMCTL_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table", global = true)]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate synthetic telemetry as NDJSON
    Simulate {
        /// Number of readings
        #[arg(long, short = 'n', default_value_t = 1000)]
        count: usize,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Share of readings with injected anomalies
        #[arg(long, default_value_t = 0.05)]
        anomaly_rate: f64,

        /// Output file (prints to stdout if not specified)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Train the failure model on an NDJSON corpus
    Train {
        /// Telemetry corpus
        #[arg(long, short)]
        data: PathBuf,

        /// Where to save the model artifact
        #[arg(long, short, env = "PM_MODEL_PATH")]
        model: Option<PathBuf>,

        /// Seed for the holdout split
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Share of samples held out for evaluation
        #[arg(long, default_value_t = 0.2)]
        holdout: f64,
    },

    /// Score readings with a saved model
    Predict {
        /// Telemetry file
        #[arg(long, short)]
        data: PathBuf,

        /// Model artifact
        #[arg(long, short, env = "PM_MODEL_PATH")]
        model: Option<PathBuf>,

        /// Only show the highest-risk components
        #[arg(long)]
        top: Option<usize>,

        /// Write predictions as NDJSON instead of printing them
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Decide FIX_NOW or WAIT for every reading in a file
    Decide {
        /// Telemetry file
        #[arg(long, short)]
        data: PathBuf,

        /// Model artifact
        #[arg(long, short, env = "PM_MODEL_PATH")]
        model: Option<PathBuf>,

        /// Cost document (defaults apply if not specified)
        #[arg(long, short, env = "PM_COST_MODEL_PATH")]
        cost: Option<PathBuf>,

        /// Write decisions as CSV
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Request recommendations from the server for every reading in a file
    Recommend {
        /// Telemetry file
        #[arg(long)]
        file: PathBuf,
    },

    /// Show the latest state of one component
    Status {
        /// Component ID
        component_id: String,
    },

    /// List known components
    Components,

    /// Reload the model artifact on the server
    Reload,

    /// Put the server back on the model it served before the last reload
    Rollback,

    /// Show server health
    Health,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn remote_client(config: &config::Config, api_url: Option<String>) -> Result<client::ApiClient> {
    client::ApiClient::new(&config.resolve_api_url(api_url))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = config::Config::load()?;
    let format = cli.format;

    match cli.command {
        Commands::Simulate {
            count,
            seed,
            anomaly_rate,
            output,
        } => {
            simulate::simulate(count, seed, anomaly_rate, output.as_deref(), format)?;
        }
        Commands::Train {
            data,
            model: model_path,
            seed,
            holdout,
        } => {
            let model_path = config.resolve_model_path(model_path);
            model::train(&data, &model_path, seed, holdout, format)?;
        }
        Commands::Predict {
            data,
            model: model_path,
            top,
            output,
        } => {
            let model_path = config.resolve_model_path(model_path);
            model::predict(&data, &model_path, top, output.as_deref(), format)?;
        }
        Commands::Decide {
            data,
            model: model_path,
            cost,
            output,
        } => {
            let model_path = config.resolve_model_path(model_path);
            let cost = config.resolve_cost_model_path(cost);
            decisions::decide(&data, &model_path, cost.as_deref(), output.as_deref(), format)?;
        }
        Commands::Recommend { file } => {
            decisions::recommend(&remote_client(&config, cli.api_url)?, &file, format).await?;
        }
        Commands::Status { component_id } => {
            let client = remote_client(&config, cli.api_url)?;
            components::component_status(&client, &component_id, format).await?;
        }
        Commands::Components => {
            components::list_components(&remote_client(&config, cli.api_url)?, format).await?;
        }
        Commands::Reload => {
            components::reload_model(&remote_client(&config, cli.api_url)?, format).await?;
        }
        Commands::Rollback => {
            components::rollback_model(&remote_client(&config, cli.api_url)?, format).await?;
        }
        Commands::Health => {
            components::health(&remote_client(&config, cli.api_url)?, format).await?;
        }
    }

    Ok(())
}
