//! Core library for crop yield prediction
//!
//! This crate provides:
//! - Typed, immutable input rows for the five agricultural features
//! - Model providers backed by ONNX graphs or linear JSON artifacts
//! - Scenario evaluation for "what-if" comparisons against a baseline
//! - Structured logging helpers for the presentation layer

pub mod error;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod scenario;

pub use error::{
    DeriveError, EvaluationError, ModelLoadError, PredictionError, RangeError, ScenarioError,
};
pub use models::*;
pub use observability::StructuredLogger;
pub use predictor::{load_model, InferenceStats, ModelConfig, ModelHandle, Predictor};
pub use scenario::{evaluate, Evaluation, Insights, ScenarioEvaluator, ScenarioSpec};
