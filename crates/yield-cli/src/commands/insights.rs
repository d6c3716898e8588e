//! Practice impact comparison and rainfall sensitivity

use anyhow::{Context, Result};
use serde::Serialize;
use tabled::Tabled;

use super::{print_inputs, ReportMeta};
use crate::output::{
    format_delta, format_rainfall, format_yield, print_json, print_table, print_warning,
    OutputFormat,
};
use yield_lib::{Insights, InputRow, Predictor, StructuredLogger};

#[derive(Serialize)]
struct InsightsReport {
    #[serde(flatten)]
    meta: ReportMeta,
    #[serde(flatten)]
    insights: Insights,
    failures: Vec<FailedScenario>,
}

#[derive(Serialize)]
struct FailedScenario {
    label: String,
    error: String,
}

/// Row for the impact table
#[derive(Tabled)]
struct ImpactRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Yield")]
    value: String,
    #[tabled(rename = "Effect")]
    effect: String,
}

/// Show baseline, irrigation and fertilizer effects, and one rainfall point
pub fn show_insights(
    model: &dyn Predictor,
    row: &InputRow,
    rainfall_sweep_mm: Option<f64>,
    logger: &StructuredLogger,
    format: OutputFormat,
) -> Result<()> {
    let model_version = model.model_version();
    // Like the sensitivity slider, start from the current rainfall
    let sweep_mm = rainfall_sweep_mm.unwrap_or_else(|| row.rainfall_mm());

    let (insights, evaluation) =
        Insights::compute(row, model, sweep_mm).context("Insight calculation failed")?;
    logger.log_evaluation(&evaluation, &model_version);

    let failures: Vec<FailedScenario> = evaluation
        .failures()
        .filter_map(|outcome| {
            outcome.error().map(|err| FailedScenario {
                label: outcome.label.clone(),
                error: err.to_string(),
            })
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&InsightsReport {
            meta: ReportMeta::new(model_version, row),
            insights,
            failures,
        })?,
        OutputFormat::Table => {
            print_inputs(row);
            println!("\nImpact of Practices");

            let mut rows = vec![ImpactRow {
                metric: "Baseline Yield",
                value: format_yield(insights.baseline),
                effect: String::new(),
            }];
            if let Some(irrigation) = insights.irrigation {
                rows.push(ImpactRow {
                    metric: "With Irrigation",
                    value: format_yield(irrigation.with),
                    effect: format_delta(irrigation.effect),
                });
            }
            if let Some(fertilizer) = insights.fertilizer {
                rows.push(ImpactRow {
                    metric: "With Fertilizer",
                    value: format_yield(fertilizer.with),
                    effect: format_delta(fertilizer.effect),
                });
            }
            print_table(&rows);

            println!("\nRainfall Sensitivity");
            match insights.rainfall {
                Some(point) => println!(
                    "At {} rainfall, predicted yield = {} ({} vs baseline)",
                    format_rainfall(point.rainfall_mm),
                    format_yield(point.value),
                    format_delta(point.delta)
                ),
                None => print_warning("Rainfall sensitivity unavailable"),
            }

            for failure in &failures {
                print_warning(&format!("Scenario {} failed: {}", failure.label, failure.error));
            }
        }
    }

    Ok(())
}
