//! Single yield prediction

use anyhow::{Context, Result};
use serde::Serialize;

use super::{print_inputs, ReportMeta};
use crate::output::{format_yield, print_info, print_json, OutputFormat};
use colored::Colorize;
use yield_lib::{InputRow, Predictor, StructuredLogger};

#[derive(Serialize)]
struct PredictionReport {
    #[serde(flatten)]
    meta: ReportMeta,
    predicted_yield: f64,
}

/// Predict yield for one input row
pub fn predict_yield(
    model: &dyn Predictor,
    row: &InputRow,
    logger: &StructuredLogger,
    format: OutputFormat,
) -> Result<()> {
    let model_version = model.model_version();
    let predicted = match model.predict(row) {
        Ok(value) => value,
        Err(err) => {
            if format == OutputFormat::Table {
                print_info("Ensure the model expects the five input columns with matching types.");
            }
            return Err(err).context("Prediction failed");
        }
    };
    logger.log_prediction(row, predicted, &model_version);

    match format {
        OutputFormat::Json => print_json(&PredictionReport {
            meta: ReportMeta::new(model_version, row),
            predicted_yield: predicted,
        })?,
        OutputFormat::Table => {
            print_inputs(row);
            println!(
                "\n🌱 Predicted Yield: {}",
                format_yield(predicted).green().bold()
            );
            println!("Model: {}", model_version);
        }
    }

    Ok(())
}
