//! "What-if" scenario evaluation
//!
//! A scenario is a labelled set of field overrides applied to a base row.
//! Every scenario in a batch derives from the same base and is compared
//! against a single baseline prediction.

mod evaluator;
mod insights;

#[cfg(test)]
mod tests;

pub use evaluator::{
    evaluate, Evaluation, EvaluationPolicy, ScenarioEvaluator, ScenarioOutcome, ScenarioValue,
};
pub use insights::{Insights, PracticeImpact, RainfallPoint};

use crate::models::{Field, FieldValue, Overrides};
use serde::Serialize;

pub const NO_IRRIGATION: &str = "no_irrigation";
pub const WITH_IRRIGATION: &str = "with_irrigation";
pub const NO_FERTILIZER: &str = "no_fertilizer";
pub const WITH_FERTILIZER: &str = "with_fertilizer";
pub const RAINFALL_SWEEP: &str = "rainfall_sweep";

/// Upper bound on the number of points in a rainfall curve
pub const MAX_CURVE_POINTS: usize = 10_000;

const CURVE_STEP_TOLERANCE: f64 = 1e-9;

/// A labelled set of overrides
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSpec {
    pub label: String,
    pub overrides: Overrides,
}

impl ScenarioSpec {
    pub fn new(label: impl Into<String>, overrides: Overrides) -> Self {
        Self {
            label: label.into(),
            overrides,
        }
    }

    /// Scenario overriding a single field
    pub fn set(label: impl Into<String>, field: Field, value: impl Into<FieldValue>) -> Self {
        Self::new(label, Overrides::new().with(field.name(), value))
    }

    /// Irrigation and fertilizer toggled off and on
    pub fn practices() -> Vec<ScenarioSpec> {
        vec![
            Self::set(NO_IRRIGATION, Field::IrrigationUsed, false),
            Self::set(WITH_IRRIGATION, Field::IrrigationUsed, true),
            Self::set(NO_FERTILIZER, Field::FertilizerUsed, false),
            Self::set(WITH_FERTILIZER, Field::FertilizerUsed, true),
        ]
    }

    pub fn rainfall_sweep(rainfall_mm: f64) -> Self {
        Self::set(RAINFALL_SWEEP, Field::RainfallMm, rainfall_mm)
    }

    /// Rainfall sensitivity curve from `start` to `end` inclusive.
    ///
    /// Points are labelled `rainfall_sweep@<mm>`. A non-positive step or an
    /// inverted range yields no points; long ranges stop after
    /// [`MAX_CURVE_POINTS`].
    pub fn rainfall_curve(start: f64, end: f64, step: f64) -> Vec<ScenarioSpec> {
        let valid = step > 0.0 && start <= end && (end - start).is_finite();
        if !valid {
            return Vec::new();
        }
        // Absorb division error so `end` is kept when it sits on a step
        let steps = (end - start) / step + CURVE_STEP_TOLERANCE;
        let count = (steps.floor() as usize).min(MAX_CURVE_POINTS - 1);
        (0..=count)
            .map(|i| {
                let rainfall = (start + step * i as f64).min(end);
                Self::set(
                    format!("{}@{}", RAINFALL_SWEEP, rainfall),
                    Field::RainfallMm,
                    rainfall,
                )
            })
            .collect()
    }
}
