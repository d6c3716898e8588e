//! CLI command implementations

pub mod about;
pub mod insights;
pub mod predict;
pub mod sweep;

use crate::output::{format_flag, format_rainfall, format_temperature, print_table};
use serde::Serialize;
use tabled::Tabled;
use yield_lib::InputRow;

/// Common header for JSON reports
#[derive(Debug, Serialize)]
pub struct ReportMeta {
    pub model_version: String,
    pub generated_at: String,
    pub input: InputRow,
}

impl ReportMeta {
    pub fn new(model_version: String, input: &InputRow) -> Self {
        Self {
            model_version,
            generated_at: chrono::Utc::now().to_rfc3339(),
            input: *input,
        }
    }
}

/// Row for the input parameters table
#[derive(Tabled)]
struct InputRowDisplay {
    #[tabled(rename = "Parameter")]
    parameter: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Print the input parameters as a table
pub fn print_inputs(row: &InputRow) {
    let rows = vec![
        InputRowDisplay {
            parameter: "Rainfall",
            value: format_rainfall(row.rainfall_mm()),
        },
        InputRowDisplay {
            parameter: "Temperature",
            value: format_temperature(row.temperature_celsius()),
        },
        InputRowDisplay {
            parameter: "Days to harvest",
            value: row.days_to_harvest().to_string(),
        },
        InputRowDisplay {
            parameter: "Fertilizer used",
            value: format_flag(row.fertilizer_used()),
        },
        InputRowDisplay {
            parameter: "Irrigation used",
            value: format_flag(row.irrigation_used()),
        },
    ];
    print_table(&rows);
}
