//! Evaluator behaviour against stub models

#[cfg(test)]
mod evaluator_tests {
    use crate::error::{DeriveError, EvaluationError, PredictionError, ScenarioError};
    use crate::models::{Field, InputRow, Overrides};
    use crate::predictor::Predictor;
    use crate::scenario::{
        evaluate, EvaluationPolicy, ScenarioEvaluator, ScenarioSpec, NO_IRRIGATION,
        RAINFALL_SWEEP, WITH_FERTILIZER, WITH_IRRIGATION,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// `2.0 * rain / 1000 + 1.5 * fertilizer + 1.2 * irrigation`
    struct StubModel {
        calls: AtomicUsize,
    }

    impl StubModel {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Predictor for StubModel {
        fn predict(&self, row: &InputRow) -> Result<f64, PredictionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let fertilizer = if row.fertilizer_used() { 1.0 } else { 0.0 };
            let irrigation = if row.irrigation_used() { 1.0 } else { 0.0 };
            Ok(2.0 * row.rainfall_mm() / 1000.0 + 1.5 * fertilizer + 1.2 * irrigation)
        }

        fn model_version(&self) -> String {
            "stub".to_string()
        }
    }

    /// Fails for any row with negative rainfall
    struct PoisonedModel;

    impl Predictor for PoisonedModel {
        fn predict(&self, row: &InputRow) -> Result<f64, PredictionError> {
            if row.rainfall_mm() < 0.0 {
                return Err(PredictionError::new("poisoned", "negative rainfall rejected"));
            }
            StubModel::new().predict(row)
        }

        fn model_version(&self) -> String {
            "poisoned".to_string()
        }
    }

    /// Rejects every row
    struct BrokenModel;

    impl Predictor for BrokenModel {
        fn predict(&self, _row: &InputRow) -> Result<f64, PredictionError> {
            Err(PredictionError::new("broken", "shape mismatch"))
        }

        fn model_version(&self) -> String {
            "broken".to_string()
        }
    }

    fn base_row() -> InputRow {
        InputRow::new(550.0, 27.5, true, true, 105)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn poisoned_batch() -> Vec<ScenarioSpec> {
        vec![
            ScenarioSpec::set(NO_IRRIGATION, Field::IrrigationUsed, false),
            ScenarioSpec::set("poisoned", Field::RainfallMm, -10.0),
            ScenarioSpec::set(WITH_FERTILIZER, Field::FertilizerUsed, true),
        ]
    }

    #[test]
    fn test_empty_scenarios_return_baseline_only() {
        let model = StubModel::new();
        let evaluation = evaluate(&base_row(), &model, &[]).unwrap();
        assert!(approx(evaluation.baseline, 3.8));
        assert!(evaluation.scenarios.is_empty());
        assert_eq!(model.calls(), 1);
    }

    #[test]
    fn test_reference_example() {
        let model = StubModel::new();
        let evaluation = evaluate(&base_row(), &model, &ScenarioSpec::practices()).unwrap();

        assert!(approx(evaluation.baseline, 3.8));

        let no_irrigation = evaluation.get(NO_IRRIGATION).unwrap();
        assert!(approx(no_irrigation.value().unwrap(), 2.6));
        assert!(approx(no_irrigation.delta().unwrap(), -1.2));

        let with_fertilizer = evaluation.get(WITH_FERTILIZER).unwrap();
        assert!(approx(with_fertilizer.value().unwrap(), 3.8));
        assert_eq!(with_fertilizer.delta().unwrap(), 0.0);
    }

    #[test]
    fn test_baseline_computed_once() {
        let model = StubModel::new();
        let scenarios = ScenarioSpec::practices();
        evaluate(&base_row(), &model, &scenarios).unwrap();
        assert_eq!(model.calls(), 1 + scenarios.len());
    }

    #[test]
    fn test_delta_is_value_minus_baseline() {
        let model = StubModel::new();
        let mut scenarios = ScenarioSpec::practices();
        scenarios.extend(ScenarioSpec::rainfall_curve(0.0, 2000.0, 250.0));
        let evaluation = evaluate(&base_row(), &model, &scenarios).unwrap();

        for outcome in &evaluation.scenarios {
            let value = outcome.result.as_ref().unwrap();
            assert_eq!(value.delta, value.value - evaluation.baseline, "{}", outcome.label);
        }
    }

    #[test]
    fn test_outcomes_keep_declaration_order() {
        let model = StubModel::new();
        let evaluation = evaluate(&base_row(), &model, &ScenarioSpec::practices()).unwrap();
        let labels: Vec<&str> = evaluation.scenarios.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["no_irrigation", "with_irrigation", "no_fertilizer", "with_fertilizer"]
        );
    }

    #[test]
    fn test_scenarios_are_independent() {
        let model = StubModel::new();
        let base = base_row();
        let evaluation = evaluate(&base, &model, &ScenarioSpec::practices()).unwrap();

        let off = evaluation.get(NO_IRRIGATION).unwrap().result.as_ref().unwrap().row;
        let on = evaluation.get(WITH_IRRIGATION).unwrap().result.as_ref().unwrap().row;
        assert!(!off.irrigation_used());
        assert!(on.irrigation_used());
        assert_eq!(off.rainfall_mm(), on.rainfall_mm());
        assert_eq!(off.temperature_celsius(), on.temperature_celsius());
        assert_eq!(off.fertilizer_used(), on.fertilizer_used());
        assert_eq!(off.days_to_harvest(), on.days_to_harvest());

        // The fertilizer scenarios never see irrigation turned off
        for outcome in &evaluation.scenarios[2..] {
            assert!(outcome.result.as_ref().unwrap().row.irrigation_used());
        }
    }

    #[test]
    fn test_base_row_unchanged_by_evaluation() {
        let model = StubModel::new();
        let base = base_row();
        let before = base;
        evaluate(&base, &model, &ScenarioSpec::practices()).unwrap();
        assert_eq!(base, before);
    }

    #[test]
    fn test_rainfall_sweep_at_zero() {
        let model = StubModel::new();
        let evaluation =
            evaluate(&base_row(), &model, &[ScenarioSpec::rainfall_sweep(0.0)]).unwrap();
        let sweep = evaluation.get(RAINFALL_SWEEP).unwrap();
        assert!(approx(sweep.value().unwrap(), 2.7));
    }

    #[test]
    fn test_rainfall_curve_points() {
        let curve = ScenarioSpec::rainfall_curve(0.0, 2000.0, 50.0);
        assert_eq!(curve.len(), 41);
        assert_eq!(curve[0].label, "rainfall_sweep@0");
        assert_eq!(curve[40].label, "rainfall_sweep@2000");

        assert_eq!(ScenarioSpec::rainfall_curve(0.0, 100.0, 30.0).len(), 4);
        assert!(ScenarioSpec::rainfall_curve(0.0, 100.0, 0.0).is_empty());
        assert!(ScenarioSpec::rainfall_curve(100.0, 0.0, 10.0).is_empty());
        assert!(ScenarioSpec::rainfall_curve(0.0, f64::INFINITY, 10.0).is_empty());
    }

    #[test]
    fn test_rainfall_curve_keeps_end_with_fractional_step() {
        let curve = ScenarioSpec::rainfall_curve(0.0, 0.3, 0.1);
        assert_eq!(curve.len(), 4);
        assert_eq!(curve[3].label, "rainfall_sweep@0.3");

        let curve = ScenarioSpec::rainfall_curve(0.0, 0.7, 0.1);
        assert_eq!(curve.len(), 8);
        assert_eq!(curve[7].label, "rainfall_sweep@0.7");
        assert_eq!(
            curve[7].overrides.get(Field::RainfallMm).and_then(|v| v.as_f64()),
            Some(0.7)
        );

        // Ranges that stop short of a step still end before `end`
        let curve = ScenarioSpec::rainfall_curve(0.0, 100.0, 30.0);
        assert_eq!(curve.last().unwrap().label, "rainfall_sweep@90");
    }

    #[test]
    fn test_partial_success_isolates_failures() {
        let evaluation = evaluate(&base_row(), &PoisonedModel, &poisoned_batch()).unwrap();

        assert_eq!(evaluation.scenarios.len(), 3);
        assert!(evaluation.scenarios[0].is_ok());
        assert!(evaluation.scenarios[2].is_ok());
        assert_eq!(evaluation.failure_count(), 1);

        let failed = &evaluation.scenarios[1];
        assert_eq!(failed.label, "poisoned");
        match failed.error() {
            Some(ScenarioError::Prediction(err)) => {
                assert_eq!(err.message, "negative rainfall rejected")
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_partial_success_is_repeatable() {
        let first = evaluate(&base_row(), &PoisonedModel, &poisoned_batch()).unwrap();
        let second = evaluate(&base_row(), &PoisonedModel, &poisoned_batch()).unwrap();
        assert_eq!(first, second);

        let evaluator = ScenarioEvaluator::new();
        assert_eq!(evaluator.policy(), EvaluationPolicy::PartialSuccess);
        let third = evaluator
            .evaluate(&base_row(), &PoisonedModel, &poisoned_batch())
            .unwrap();
        assert_eq!(first, third);
    }

    #[test]
    fn test_fail_fast_aborts_deterministically() {
        let evaluator = ScenarioEvaluator::with_policy(EvaluationPolicy::FailFast);
        for _ in 0..3 {
            let err = evaluator
                .evaluate(&base_row(), &PoisonedModel, &poisoned_batch())
                .unwrap_err();
            match err {
                EvaluationError::Scenario { label, source } => {
                    assert_eq!(label, "poisoned");
                    assert!(matches!(source, ScenarioError::Prediction(_)));
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_invalid_override_reported_per_scenario() {
        let model = StubModel::new();
        let scenarios = vec![
            ScenarioSpec::new("bad_field", Overrides::new().with("soil_ph", 6.5)),
            ScenarioSpec::new("bad_value", Overrides::new().with("irrigation_used", 1.0)),
            ScenarioSpec::rainfall_sweep(1000.0),
        ];
        let evaluation = evaluate(&base_row(), &model, &scenarios).unwrap();

        assert!(matches!(
            evaluation.scenarios[0].error(),
            Some(ScenarioError::Derive(DeriveError::InvalidField { .. }))
        ));
        assert!(matches!(
            evaluation.scenarios[1].error(),
            Some(ScenarioError::Derive(DeriveError::InvalidValue { .. }))
        ));
        assert!(evaluation.scenarios[2].is_ok());
        // Derive failures never reach the model
        assert_eq!(model.calls(), 2);
    }

    #[test]
    fn test_baseline_failure_aborts() {
        let err = evaluate(&base_row(), &BrokenModel, &ScenarioSpec::practices()).unwrap_err();
        assert_eq!(err.message, "shape mismatch");

        let err = ScenarioEvaluator::new()
            .evaluate(&base_row(), &BrokenModel, &ScenarioSpec::practices())
            .unwrap_err();
        assert!(matches!(err, EvaluationError::Baseline(_)));
    }

    #[test]
    fn test_evaluates_through_shared_handle() {
        use crate::predictor::ModelHandle;
        use std::sync::Arc;

        let handle: ModelHandle = Arc::new(StubModel::new());
        let evaluation = evaluate(&base_row(), handle.as_ref(), &ScenarioSpec::practices()).unwrap();
        assert!(approx(evaluation.baseline, 3.8));

        let threads: Vec<_> = (0..4)
            .map(|i| {
                let handle = Arc::clone(&handle);
                std::thread::spawn(move || {
                    let base = base_row()
                        .derive(&Overrides::new().with("rainfall_mm", 250.0 * i as f64))
                        .unwrap();
                    evaluate(&base, &handle, &ScenarioSpec::practices()).unwrap()
                })
            })
            .collect();
        for thread in threads {
            let evaluation = thread.join().unwrap();
            assert_eq!(evaluation.failure_count(), 0);
        }
    }
}
