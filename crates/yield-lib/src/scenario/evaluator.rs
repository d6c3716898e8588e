//! Scenario evaluation against a shared baseline

use super::ScenarioSpec;
use crate::error::{EvaluationError, PredictionError, ScenarioError};
use crate::models::InputRow;
use crate::predictor::Predictor;

/// How a failing scenario affects the rest of the batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EvaluationPolicy {
    /// Record the failure on that scenario and keep going
    #[default]
    PartialSuccess,
    /// Abort the batch on the first failing scenario
    FailFast,
}

/// A successful scenario prediction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioValue {
    /// The derived row the model was queried with
    pub row: InputRow,
    pub value: f64,
    /// `value - baseline`
    pub delta: f64,
}

/// Result of one scenario in a batch
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioOutcome {
    pub label: String,
    pub result: Result<ScenarioValue, ScenarioError>,
}

impl ScenarioOutcome {
    pub fn value(&self) -> Option<f64> {
        self.result.as_ref().ok().map(|v| v.value)
    }

    pub fn delta(&self) -> Option<f64> {
        self.result.as_ref().ok().map(|v| v.delta)
    }

    pub fn error(&self) -> Option<&ScenarioError> {
        self.result.as_ref().err()
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Baseline plus per-scenario outcomes, in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub base: InputRow,
    pub baseline: f64,
    pub scenarios: Vec<ScenarioOutcome>,
}

impl Evaluation {
    /// First outcome with the given label
    pub fn get(&self, label: &str) -> Option<&ScenarioOutcome> {
        self.scenarios.iter().find(|s| s.label == label)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.scenarios.iter().filter(|s| !s.is_ok())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }
}

/// Stateless batch evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioEvaluator {
    policy: EvaluationPolicy,
}

impl ScenarioEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: EvaluationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> EvaluationPolicy {
        self.policy
    }

    /// Predict the baseline once, then every scenario in order.
    ///
    /// Each scenario derives from `base`; overrides never carry over from
    /// one scenario to the next. A failing baseline always aborts.
    pub fn evaluate<P: Predictor + ?Sized>(
        &self,
        base: &InputRow,
        model: &P,
        scenarios: &[ScenarioSpec],
    ) -> Result<Evaluation, EvaluationError> {
        let baseline = model.predict(base).map_err(EvaluationError::Baseline)?;

        let mut outcomes = Vec::with_capacity(scenarios.len());
        for spec in scenarios {
            let result = evaluate_scenario(base, model, spec, baseline);
            if let (EvaluationPolicy::FailFast, Err(source)) = (self.policy, &result) {
                return Err(EvaluationError::Scenario {
                    label: spec.label.clone(),
                    source: source.clone(),
                });
            }
            outcomes.push(ScenarioOutcome {
                label: spec.label.clone(),
                result,
            });
        }

        Ok(Evaluation {
            base: *base,
            baseline,
            scenarios: outcomes,
        })
    }
}

/// Evaluate `scenarios` with the partial-success policy.
///
/// Only a failing baseline prediction is an error; per-scenario failures
/// are reported on their outcome.
pub fn evaluate<P: Predictor + ?Sized>(
    base: &InputRow,
    model: &P,
    scenarios: &[ScenarioSpec],
) -> Result<Evaluation, PredictionError> {
    let baseline = model.predict(base)?;
    let scenarios = scenarios
        .iter()
        .map(|spec| ScenarioOutcome {
            label: spec.label.clone(),
            result: evaluate_scenario(base, model, spec, baseline),
        })
        .collect();

    Ok(Evaluation {
        base: *base,
        baseline,
        scenarios,
    })
}

fn evaluate_scenario<P: Predictor + ?Sized>(
    base: &InputRow,
    model: &P,
    spec: &ScenarioSpec,
    baseline: f64,
) -> Result<ScenarioValue, ScenarioError> {
    let row = base.derive(&spec.overrides)?;
    let value = model.predict(&row)?;
    Ok(ScenarioValue {
        row,
        value,
        delta: value - baseline,
    })
}
