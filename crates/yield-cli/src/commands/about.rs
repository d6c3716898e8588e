//! Static description of the predictor

use anyhow::Result;
use serde::Serialize;

use crate::output::{print_json, OutputFormat};
use colored::Colorize;
use yield_lib::Field;

#[derive(Serialize)]
struct AboutReport {
    name: &'static str,
    version: &'static str,
    features: Vec<FeatureInfo>,
    findings: &'static [&'static str],
}

#[derive(Serialize)]
struct FeatureInfo {
    name: &'static str,
    column: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<f64>,
}

const FINDINGS: &[&str] = &[
    "Fertilizer boosts yield by ~1.5 tons/ha.",
    "Irrigation improves yield by ~1.2 tons/ha.",
    "Rainfall and temperature strongly influence crop choice and yield.",
];

fn label(field: Field) -> &'static str {
    match field {
        Field::RainfallMm => "Rainfall (mm)",
        Field::TemperatureCelsius => "Temperature (°C)",
        Field::DaysToHarvest => "Days to harvest",
        Field::FertilizerUsed => "Fertilizer used",
        Field::IrrigationUsed => "Irrigation used",
    }
}

/// Describe the model inputs and known practice effects
pub fn show_about(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&AboutReport {
            name: "Crop Yield Predictor",
            version: env!("CARGO_PKG_VERSION"),
            features: Field::ALL
                .into_iter()
                .map(|field| FeatureInfo {
                    name: field.name(),
                    column: field.column(),
                    min: field.domain().map(|(min, _)| min),
                    max: field.domain().map(|(_, max)| max),
                })
                .collect(),
            findings: FINDINGS,
        })?,
        OutputFormat::Table => {
            println!("{}", "🌾 Crop Yield Predictor".bold());
            println!("Predicts crop yield with a pre-trained regression pipeline.\n");
            println!("{}", "Features used:".bold());
            for field in Field::ALL {
                println!("  - {}", label(field));
            }
            println!("\n{}", "Insights from analysis:".bold());
            for finding in FINDINGS {
                println!("  - {}", finding);
            }
        }
    }

    Ok(())
}
