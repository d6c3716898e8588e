//! Error types surfaced by the prediction core

use crate::models::{RangeViolation, ValueKind};
use std::path::PathBuf;
use thiserror::Error;

/// Failure to load a model artifact. Fatal at startup.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("Model file not found at: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read model file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported model format for {} (expected .onnx or .json)", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Model file {} is {size} bytes, exceeding the {limit} byte limit", path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Checksum mismatch for {}: expected {expected}, got {actual}", path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("Failed to load model {}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// The model rejected a row or failed internally
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Prediction failed (model {model_version}): {message}")]
pub struct PredictionError {
    pub model_version: String,
    pub message: String,
}

impl PredictionError {
    pub fn new(model_version: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            model_version: model_version.into(),
            message: message.into(),
        }
    }
}

/// Invalid override passed to [`crate::InputRow::derive`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeriveError {
    #[error("Unknown field '{field}'")]
    InvalidField { field: String },

    #[error("Invalid value for '{field}': expected {expected}, found {found}")]
    InvalidValue {
        field: String,
        expected: ValueKind,
        found: ValueKind,
    },
}

/// One or more inputs fall outside their accepted domain
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", format_violations(.violations))]
pub struct RangeError {
    pub violations: Vec<RangeViolation>,
}

fn format_violations(violations: &[RangeViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Why a single scenario produced no value
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Derive(#[from] DeriveError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

/// Error aborting a whole evaluation batch
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("Baseline prediction failed: {0}")]
    Baseline(#[source] PredictionError),

    #[error("Scenario '{label}' failed: {source}")]
    Scenario {
        label: String,
        #[source]
        source: ScenarioError,
    },
}
