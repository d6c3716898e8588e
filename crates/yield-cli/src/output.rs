//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a rounded table from a list of rows
pub fn print_table<T: Tabled>(rows: &[T]) {
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a yield as tons per hectare
pub fn format_yield(value: f64) -> String {
    format!("{:.2} t/ha", value)
}

/// Format a signed difference, colored by direction
pub fn format_delta(delta: f64) -> String {
    let formatted = format!("{:+.2}", delta);
    if delta > 0.005 {
        formatted.green().to_string()
    } else if delta < -0.005 {
        formatted.red().to_string()
    } else {
        formatted
    }
}

pub fn format_rainfall(mm: f64) -> String {
    format!("{} mm", mm)
}

pub fn format_temperature(celsius: f64) -> String {
    format!("{:.1} °C", celsius)
}

pub fn format_flag(value: bool) -> String {
    if value {
        "yes".green().to_string()
    } else {
        "no".dimmed().to_string()
    }
}
