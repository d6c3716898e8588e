//! Model providers for yield prediction

mod inference;
mod linear;
mod loader;

pub use inference::OnnxPredictor;
pub use linear::{LinearModelSpec, LinearPredictor};
pub use loader::{load_model, ModelConfig, ModelFormat, DEFAULT_MAX_MODEL_BYTES, DEFAULT_MODEL_PATH};

use crate::error::PredictionError;
use crate::models::InputRow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Maximum inference latency before warning (5ms target)
const MAX_INFERENCE_MS: u128 = 5;

/// Trait for prediction implementations.
///
/// Implementations must be safe for concurrent read-only use; a loaded
/// model is shared across every caller for the life of the process.
pub trait Predictor: Send + Sync {
    /// Predict yield in tons per hectare for a single row
    fn predict(&self, row: &InputRow) -> Result<f64, PredictionError>;

    /// Get current model version
    fn model_version(&self) -> String;

    /// Inference counters, for providers that keep them
    fn stats(&self) -> Option<InferenceStats> {
        None
    }
}

/// Shared handle to a model loaded once at startup
pub type ModelHandle = Arc<dyn Predictor>;

impl<P: Predictor + ?Sized> Predictor for Arc<P> {
    fn predict(&self, row: &InputRow) -> Result<f64, PredictionError> {
        (**self).predict(row)
    }

    fn model_version(&self) -> String {
        (**self).model_version()
    }

    fn stats(&self) -> Option<InferenceStats> {
        (**self).stats()
    }
}

/// Inference statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferenceStats {
    pub total_inferences: u64,
    pub slow_inferences: u64,
}

#[derive(Debug, Default)]
struct InferenceCounters {
    inference_count: AtomicU64,
    slow_inference_count: AtomicU64,
}

impl InferenceCounters {
    fn record(&self, elapsed: Duration) {
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        if elapsed.as_millis() > MAX_INFERENCE_MS {
            self.slow_inference_count.fetch_add(1, Ordering::Relaxed);
            warn!(elapsed_ms = elapsed.as_millis(), "Inference exceeded {}ms target", MAX_INFERENCE_MS);
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
        }
    }

    fn snapshot(&self) -> InferenceStats {
        InferenceStats {
            total_inferences: self.inference_count.load(Ordering::Relaxed),
            slow_inferences: self.slow_inference_count.load(Ordering::Relaxed),
        }
    }
}
