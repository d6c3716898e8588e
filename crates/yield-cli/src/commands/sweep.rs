//! Rainfall sensitivity curve

use anyhow::{Context, Result};
use serde::Serialize;
use tabled::Tabled;

use super::{print_inputs, ReportMeta};
use crate::output::{
    format_delta, format_rainfall, format_yield, print_json, print_table, print_warning,
    OutputFormat,
};
use yield_lib::{evaluate, Field, InputRow, Predictor, ScenarioSpec, StructuredLogger};

#[derive(Serialize)]
struct SweepReport {
    #[serde(flatten)]
    meta: ReportMeta,
    baseline: f64,
    points: Vec<SweepPoint>,
}

#[derive(Serialize)]
struct SweepPoint {
    rainfall_mm: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Row for the sweep table
#[derive(Tabled)]
struct SweepRow {
    #[tabled(rename = "Rainfall")]
    rainfall: String,
    #[tabled(rename = "Yield")]
    value: String,
    #[tabled(rename = "Δ Baseline")]
    delta: String,
}

/// Predict yield across a range of rainfall values
pub fn rainfall_sweep(
    model: &dyn Predictor,
    row: &InputRow,
    (start, end, step): (f64, f64, f64),
    logger: &StructuredLogger,
    format: OutputFormat,
) -> Result<()> {
    let model_version = model.model_version();
    let specs = ScenarioSpec::rainfall_curve(start, end, step);

    let evaluation = evaluate(row, model, &specs).context("Rainfall sweep failed")?;
    logger.log_evaluation(&evaluation, &model_version);

    let points: Vec<SweepPoint> = specs
        .iter()
        .zip(&evaluation.scenarios)
        .map(|(spec, outcome)| SweepPoint {
            rainfall_mm: curve_rainfall(spec, start),
            value: outcome.value(),
            delta: outcome.delta(),
            error: outcome.error().map(ToString::to_string),
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&SweepReport {
            meta: ReportMeta::new(model_version, row),
            baseline: evaluation.baseline,
            points,
        })?,
        OutputFormat::Table => {
            if points.is_empty() {
                print_warning("No rainfall points in range");
                return Ok(());
            }

            print_inputs(row);
            println!("\nBaseline: {}", format_yield(evaluation.baseline));

            let rows: Vec<SweepRow> = points
                .iter()
                .map(|p| SweepRow {
                    rainfall: format_rainfall(p.rainfall_mm),
                    value: p.value.map(format_yield).unwrap_or_else(|| "error".to_string()),
                    delta: p.delta.map(format_delta).unwrap_or_default(),
                })
                .collect();
            print_table(&rows);

            for point in points.iter().filter(|p| p.error.is_some()) {
                print_warning(&format!(
                    "At {}: {}",
                    format_rainfall(point.rainfall_mm),
                    point.error.as_deref().unwrap_or_default()
                ));
            }
        }
    }

    Ok(())
}

/// Rainfall value a curve point was declared with
fn curve_rainfall(spec: &ScenarioSpec, fallback: f64) -> f64 {
    spec.overrides
        .get(Field::RainfallMm)
        .and_then(|value| value.as_f64())
        .unwrap_or(fallback)
}
