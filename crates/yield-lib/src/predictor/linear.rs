//! Linear regression model loaded from a JSON artifact
//!
//! Artifact layout:
//!
//! ```json
//! {
//!   "version": "linreg-2024.1",
//!   "intercept": 0.4,
//!   "coefficients": {
//!     "Rainfall_mm": 0.002,
//!     "Temperature_Celsius": 0.01,
//!     "Fertilizer_Used": 1.5,
//!     "Irrigation_Used": 1.2,
//!     "Days_to_Harvest": 0.0
//!   }
//! }
//! ```
//!
//! Coefficient keys may use either column or snake_case names, in any order.
//! Every feature must have exactly one coefficient.

use super::{InferenceCounters, InferenceStats, Predictor};
use crate::error::PredictionError;
use crate::models::{Field, InputRow};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

fn default_version() -> String {
    "linear".to_string()
}

/// On-disk representation of a linear model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModelSpec {
    #[serde(default = "default_version")]
    pub version: String,
    pub intercept: f64,
    pub coefficients: BTreeMap<String, f64>,
}

/// Predictor computing `intercept + sum(coefficient * feature)`
pub struct LinearPredictor {
    version: String,
    intercept: f64,
    weights: [f64; 5],
    counters: InferenceCounters,
}

impl LinearPredictor {
    /// Build from explicit per-field weights
    pub fn new(version: impl Into<String>, intercept: f64, weights: [(Field, f64); 5]) -> Self {
        let mut ordered = [0.0; 5];
        for (field, weight) in weights {
            ordered[Self::index(field)] = weight;
        }
        Self {
            version: version.into(),
            intercept,
            weights: ordered,
            counters: InferenceCounters::default(),
        }
    }

    /// Parse a JSON artifact
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let spec: LinearModelSpec =
            serde_json::from_slice(bytes).context("Failed to parse linear model JSON")?;
        Self::from_spec(spec)
    }

    pub fn from_spec(spec: LinearModelSpec) -> Result<Self> {
        let mut weights: [Option<f64>; 5] = [None; 5];
        for (name, weight) in &spec.coefficients {
            let field: Field = name
                .parse()
                .with_context(|| format!("Unknown coefficient '{}'", name))?;
            let slot = &mut weights[Self::index(field)];
            if slot.is_some() {
                bail!("Duplicate coefficient for '{}'", field);
            }
            *slot = Some(*weight);
        }

        let mut ordered = [0.0; 5];
        for field in Field::ALL {
            ordered[Self::index(field)] = weights[Self::index(field)]
                .with_context(|| format!("Missing coefficient for '{}'", field.column()))?;
        }

        Ok(Self {
            version: spec.version,
            intercept: spec.intercept,
            weights: ordered,
            counters: InferenceCounters::default(),
        })
    }

    /// Position of `field` in [`Field::ALL`]
    fn index(field: Field) -> usize {
        field as usize
    }
}

impl Predictor for LinearPredictor {
    fn predict(&self, row: &InputRow) -> Result<f64, PredictionError> {
        let start = Instant::now();
        let features = [
            row.rainfall_mm(),
            row.temperature_celsius(),
            f64::from(u8::from(row.fertilizer_used())),
            f64::from(u8::from(row.irrigation_used())),
            row.days_to_harvest() as f64,
        ];
        let value = self.intercept
            + self
                .weights
                .iter()
                .zip(features)
                .map(|(weight, feature)| weight * feature)
                .sum::<f64>();
        self.counters.record(start.elapsed());
        Ok(value)
    }

    fn model_version(&self) -> String {
        self.version.clone()
    }

    fn stats(&self) -> Option<InferenceStats> {
        Some(self.counters.snapshot())
    }
}
