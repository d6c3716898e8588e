//! Structured logging for prediction events
//!
//! The evaluator itself never logs; callers hand their results to
//! [`StructuredLogger`] so every event carries the same fields.

use crate::error::ModelLoadError;
use crate::models::InputRow;
use crate::predictor::InferenceStats;
use crate::scenario::Evaluation;
use std::path::Path;
use tracing::{error, info, warn};

/// Structured logger for predictor events
///
/// Provides consistent JSON-formatted logging for model loading,
/// predictions and scenario evaluations.
#[derive(Clone)]
pub struct StructuredLogger {
    component: String,
}

impl StructuredLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    /// Log startup
    pub fn log_startup(&self, version: &str) {
        info!(
            event = "startup",
            component = %self.component,
            version = %version,
            "Crop yield predictor started"
        );
    }

    /// Log a successful model load
    pub fn log_model_loaded(&self, path: &Path, model_version: &str) {
        info!(
            event = "model_loaded",
            component = %self.component,
            path = %path.display(),
            model_version = %model_version,
            "Model ready for predictions"
        );
    }

    /// Log a fatal model load failure
    pub fn log_model_load_failed(&self, err: &ModelLoadError) {
        error!(
            event = "model_load_failed",
            component = %self.component,
            error = %err,
            "Model could not be loaded"
        );
    }

    /// Log a single prediction
    pub fn log_prediction(&self, row: &InputRow, predicted_yield: f64, model_version: &str) {
        info!(
            event = "prediction_generated",
            component = %self.component,
            rainfall_mm = row.rainfall_mm(),
            temperature_celsius = row.temperature_celsius(),
            fertilizer_used = row.fertilizer_used(),
            irrigation_used = row.irrigation_used(),
            days_to_harvest = row.days_to_harvest(),
            predicted_yield = predicted_yield,
            model_version = %model_version,
            "Generated yield prediction"
        );
    }

    /// Log a completed evaluation, with one warning per failed scenario
    pub fn log_evaluation(&self, evaluation: &Evaluation, model_version: &str) {
        for outcome in evaluation.failures() {
            if let Some(err) = outcome.error() {
                warn!(
                    event = "scenario_failed",
                    component = %self.component,
                    label = %outcome.label,
                    error = %err,
                    model_version = %model_version,
                    "Scenario evaluation failed"
                );
            }
        }

        info!(
            event = "evaluation_completed",
            component = %self.component,
            baseline = evaluation.baseline,
            scenarios = evaluation.scenarios.len(),
            failed = evaluation.failure_count(),
            model_version = %model_version,
            "Scenario evaluation completed"
        );
    }

    /// Log the model's inference counters
    pub fn log_inference_stats(&self, stats: &InferenceStats, model_version: &str) {
        info!(
            event = "inference_stats",
            component = %self.component,
            total_inferences = stats.total_inferences,
            slow_inferences = stats.slow_inferences,
            model_version = %model_version,
            "Inference statistics"
        );
    }
}
