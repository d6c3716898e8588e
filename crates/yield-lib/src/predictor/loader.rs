//! Model artifact loading
//!
//! The artifact is read once at startup, optionally pinned by SHA-256,
//! and turned into a shared [`ModelHandle`].

use super::{LinearPredictor, ModelHandle, OnnxPredictor};
use crate::error::ModelLoadError;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Default model artifact path
pub const DEFAULT_MODEL_PATH: &str = "crop_yield_model.onnx";

/// Maximum model size in bytes (64MB)
pub const DEFAULT_MAX_MODEL_BYTES: u64 = 64 * 1024 * 1024;

/// Configuration for model loading
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Path to the serialized model
    pub path: PathBuf,
    /// Expected SHA-256 of the artifact (hex), verified before parsing
    pub expected_sha256: Option<String>,
    /// Maximum accepted artifact size in bytes
    pub max_model_bytes: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MODEL_PATH),
            expected_sha256: None,
            max_model_bytes: DEFAULT_MAX_MODEL_BYTES,
        }
    }
}

impl ModelConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

/// Supported artifact formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Onnx,
    LinearJson,
}

impl ModelFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "onnx" => Some(ModelFormat::Onnx),
            "json" => Some(ModelFormat::LinearJson),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFormat::Onnx => "onnx",
            ModelFormat::LinearJson => "linear-json",
        }
    }
}

/// Load a model artifact from disk
pub fn load_model(config: &ModelConfig) -> Result<ModelHandle, ModelLoadError> {
    let path = config.path.as_path();
    if !path.exists() {
        return Err(ModelLoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let format = ModelFormat::from_path(path).ok_or_else(|| ModelLoadError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    let io_err = |source: std::io::Error| ModelLoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let size = fs::metadata(path).map_err(io_err)?.len();
    if size > config.max_model_bytes {
        return Err(ModelLoadError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit: config.max_model_bytes,
        });
    }

    let bytes = fs::read(path).map_err(io_err)?;
    let checksum = hex::encode(Sha256::digest(&bytes));
    if let Some(expected) = &config.expected_sha256 {
        if !expected.trim().eq_ignore_ascii_case(&checksum) {
            return Err(ModelLoadError::ChecksumMismatch {
                path: path.to_path_buf(),
                expected: expected.trim().to_string(),
                actual: checksum,
            });
        }
        debug!(checksum = %checksum, "Model checksum verified");
    }

    let invalid = |e: anyhow::Error| ModelLoadError::Invalid {
        path: path.to_path_buf(),
        reason: format!("{e:#}"),
    };
    let model: ModelHandle = match format {
        ModelFormat::Onnx => {
            // ONNX graphs carry no version field; the checksum prefix identifies them
            let version = format!("onnx-{}", &checksum[..12]);
            Arc::new(OnnxPredictor::new(&bytes, version).map_err(invalid)?)
        }
        ModelFormat::LinearJson => Arc::new(LinearPredictor::from_json(&bytes).map_err(invalid)?),
    };

    info!(
        path = %path.display(),
        format = format.as_str(),
        size_bytes = size,
        model_version = %model.model_version(),
        "Model loaded"
    );

    Ok(model)
}
