//! Practice impact summary built from a scenario evaluation

use super::{
    evaluate, Evaluation, ScenarioSpec, NO_FERTILIZER, NO_IRRIGATION, RAINFALL_SWEEP,
    WITH_FERTILIZER, WITH_IRRIGATION,
};
use crate::error::PredictionError;
use crate::models::InputRow;
use crate::predictor::Predictor;
use serde::Serialize;

/// Yield with and without a practice
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PracticeImpact {
    pub without: f64,
    pub with: f64,
    /// `with - without`
    pub effect: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RainfallPoint {
    pub rainfall_mm: f64,
    pub value: f64,
    pub delta: f64,
}

/// Baseline, practice effects and the rainfall sensitivity point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub baseline: f64,
    pub irrigation: Option<PracticeImpact>,
    pub fertilizer: Option<PracticeImpact>,
    pub rainfall: Option<RainfallPoint>,
}

impl Insights {
    /// The four practice scenarios followed by a rainfall sweep point
    pub fn scenarios(rainfall_sweep_mm: f64) -> Vec<ScenarioSpec> {
        let mut specs = ScenarioSpec::practices();
        specs.push(ScenarioSpec::rainfall_sweep(rainfall_sweep_mm));
        specs
    }

    /// Evaluate [`Insights::scenarios`] and summarize them
    pub fn compute<P: Predictor + ?Sized>(
        base: &InputRow,
        model: &P,
        rainfall_sweep_mm: f64,
    ) -> Result<(Insights, Evaluation), PredictionError> {
        let evaluation = evaluate(base, model, &Self::scenarios(rainfall_sweep_mm))?;
        Ok((Self::from_evaluation(&evaluation), evaluation))
    }

    /// Summarize an evaluation. Missing or failed scenarios leave the
    /// corresponding entry empty.
    pub fn from_evaluation(evaluation: &Evaluation) -> Self {
        let impact = |without: &str, with: &str| -> Option<PracticeImpact> {
            let without = evaluation.get(without)?.value()?;
            let with = evaluation.get(with)?.value()?;
            Some(PracticeImpact {
                without,
                with,
                effect: with - without,
            })
        };

        let rainfall = evaluation
            .get(RAINFALL_SWEEP)
            .and_then(|outcome| outcome.result.as_ref().ok())
            .map(|v| RainfallPoint {
                rainfall_mm: v.row.rainfall_mm(),
                value: v.value,
                delta: v.delta,
            });

        Self {
            baseline: evaluation.baseline,
            irrigation: impact(NO_IRRIGATION, WITH_IRRIGATION),
            fertilizer: impact(NO_FERTILIZER, WITH_FERTILIZER),
            rainfall,
        }
    }
}
