//! Crop Yield Predictor CLI
//!
//! Predicts crop yield from rainfall, temperature, harvest time and
//! farming practices, and compares "what-if" scenarios against the
//! current inputs.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use commands::{about, insights, predict, sweep};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use yield_lib::{load_model, InputRow, StructuredLogger};

const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crop Yield Predictor CLI
#[derive(Parser)]
#[command(name = "cyp")]
#[command(author, version, about = "Crop Yield Predictor: predict yield and explore the impact of irrigation and fertilizer", long_about = None)]
pub struct Cli {
    /// Path to the model artifact (.onnx or .json)
    #[arg(long, env = "CROP_YIELD_MODEL", global = true)]
    pub model: Option<PathBuf>,

    /// Expected SHA-256 of the model artifact
    #[arg(long, env = "CROP_YIELD_MODEL_SHA256", global = true)]
    pub model_sha256: Option<String>,

    /// Configuration file (TOML or JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, global = true)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict yield for the given inputs
    Predict {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Compare irrigation and fertilizer scenarios and check rainfall sensitivity
    Insights {
        #[command(flatten)]
        input: InputArgs,

        /// Rainfall (mm) for the sensitivity check (defaults to --rainfall)
        #[arg(long, allow_negative_numbers = true)]
        rainfall_sweep: Option<f64>,
    },

    /// Predict yield across a range of rainfall values
    Sweep {
        #[command(flatten)]
        input: InputArgs,

        /// First rainfall value (mm)
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        start: f64,

        /// Last rainfall value (mm)
        #[arg(long, default_value_t = 2000.0, allow_negative_numbers = true)]
        end: f64,

        /// Rainfall step (mm)
        #[arg(long, default_value_t = 50.0)]
        step: f64,
    },

    /// Describe the model inputs and known practice effects
    About,
}

/// Agricultural inputs shared by the prediction commands
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Rainfall (mm), 0 to 2000
    #[arg(long, default_value_t = 550.0, allow_negative_numbers = true)]
    pub rainfall: f64,

    /// Temperature (°C), -5 to 50
    #[arg(long, default_value_t = 27.5, allow_negative_numbers = true)]
    pub temperature: f64,

    /// Days to harvest, 30 to 300
    #[arg(long, default_value_t = 105, allow_negative_numbers = true)]
    pub days: i64,

    /// Fertilizer used
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub fertilizer: bool,

    /// Irrigation used
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub irrigation: bool,
}

impl InputArgs {
    /// Build an input row, rejecting values outside the accepted ranges
    pub fn to_row(&self) -> Result<InputRow> {
        InputRow::builder()
            .rainfall_mm(self.rainfall)
            .temperature_celsius(self.temperature)
            .days_to_harvest(self.days)
            .fertilizer_used(self.fertilizer)
            .irrigation_used(self.irrigation)
            .build_validated()
            .context("Invalid input parameters")
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let logger = StructuredLogger::new("cyp");
    logger.log_startup(CLI_VERSION);

    let mut app_config = config::AppConfig::load(cli.config.as_deref())?;
    if let Some(model) = &cli.model {
        app_config.model_path = model.clone();
    }
    if let Some(checksum) = &cli.model_sha256 {
        app_config.expected_sha256 = Some(checksum.clone());
    }
    let format = cli.format.unwrap_or(app_config.default_format);

    let input = match &cli.command {
        Commands::About => return about::show_about(format),
        Commands::Predict { input }
        | Commands::Insights { input, .. }
        | Commands::Sweep { input, .. } => input,
    };

    // Inputs are checked before the model is loaded
    let row = input.to_row()?;

    let model_config = app_config.model_config();
    let model = match load_model(&model_config) {
        Ok(model) => model,
        Err(err) => {
            logger.log_model_load_failed(&err);
            return Err(err).context("Failed to load model");
        }
    };
    let model_version = model.model_version();
    logger.log_model_loaded(&model_config.path, &model_version);
    info!(command = command_name(&cli.command), "Running command");

    let result = match &cli.command {
        Commands::Predict { .. } => predict::predict_yield(model.as_ref(), &row, &logger, format),
        Commands::Insights { rainfall_sweep, .. } => {
            insights::show_insights(model.as_ref(), &row, *rainfall_sweep, &logger, format)
        }
        Commands::Sweep {
            start, end, step, ..
        } => sweep::rainfall_sweep(model.as_ref(), &row, (*start, *end, *step), &logger, format),
        Commands::About => about::show_about(format),
    };

    if let Some(stats) = model.stats() {
        logger.log_inference_stats(&stats, &model_version);
    }
    result
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Predict { .. } => "predict",
        Commands::Insights { .. } => "insights",
        Commands::Sweep { .. } => "sweep",
        Commands::About => "about",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_input_defaults_match_form() {
        let cli = Cli::parse_from(["cyp", "predict"]);
        let Commands::Predict { input } = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(input.to_row().unwrap(), InputRow::default());
    }

    #[test]
    fn test_boolean_flags_take_values() {
        let cli = Cli::parse_from(["cyp", "predict", "--irrigation", "false", "--temperature", "-2"]);
        let Commands::Predict { input } = cli.command else {
            panic!("expected predict");
        };
        let row = input.to_row().unwrap();
        assert!(!row.irrigation_used());
        assert!(row.fertilizer_used());
        assert_eq!(row.temperature_celsius(), -2.0);
    }

    #[test]
    fn test_out_of_range_inputs_rejected() {
        let cli = Cli::parse_from(["cyp", "insights", "--rainfall", "2500", "--days", "10"]);
        let Commands::Insights { input, .. } = cli.command else {
            panic!("expected insights");
        };
        let err = input.to_row().unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("rainfall_mm"));
        assert!(message.contains("days_to_harvest"));
    }
}
