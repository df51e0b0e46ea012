mod field;

use clap::{Parser, Subcommand};
use locfield_core::AppConfig;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Parser)]
#[command(name = "locfield")]
#[command(about = "Drive a location form field from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch and show the field configuration from the admin host
    Config,
    /// List place predictions for typed text
    Search {
        /// Text as typed into the field
        text: String,
    },
    /// Search, then resolve one of the returned predictions
    Select {
        /// Text as typed into the field
        text: String,
        /// Place id of the prediction to resolve
        place_id: String,
    },
    /// Declare a custom location, optionally with coordinates
    Custom {
        description: String,
        #[arg(long, allow_hyphen_values = true, value_parser = parse_coordinate)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true, value_parser = parse_coordinate)]
        lng: Option<f64>,
    },
    /// Decode a persisted location value
    Decode {
        /// Encoded value, e.g. as stored by the host
        raw: String,
    },
}

fn parse_coordinate(raw: &str) -> Result<f64, String> {
    let coordinate: f64 = raw.parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    if coordinate.is_finite() {
        Ok(coordinate)
    } else {
        Err(format!("coordinate must be a finite number, got {raw}"))
    }
}

fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

/// Loads the admin host settings; only commands that go online need them.
fn load_config() -> anyhow::Result<AppConfig> {
    let config = locfield_core::load_app_config()?;
    init_tracing(&config.log_level)?;
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config => field::run_config(&load_config()?).await?,
        Commands::Search { text } => field::run_search(&load_config()?, &text).await?,
        Commands::Select { text, place_id } => {
            field::run_select(&load_config()?, &text, &place_id).await?;
        }
        Commands::Custom {
            description,
            lat,
            lng,
        } => {
            init_tracing(DEFAULT_LOG_LEVEL)?;
            field::run_custom(&description, lat, lng);
        }
        Commands::Decode { raw } => {
            init_tracing(DEFAULT_LOG_LEVEL)?;
            field::run_decode(&raw)?;
        }
    }

    Ok(())
}
