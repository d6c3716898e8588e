//! Configuration management for the CLI
//!
//! Sources, lowest precedence first: built-in defaults, a config file
//! (`--config`, else `~/.config/crop-yield/config.{toml,json}`), then
//! `CROP_YIELD_*` environment variables. Command-line flags are applied on
//! top by the caller.

use crate::output::OutputFormat;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use yield_lib::predictor::{DEFAULT_MAX_MODEL_BYTES, DEFAULT_MODEL_PATH};
use yield_lib::ModelConfig;

/// CLI configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Path to the model artifact
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Expected SHA-256 of the model artifact
    #[serde(default)]
    pub expected_sha256: Option<String>,

    /// Maximum accepted model size in bytes
    #[serde(default = "default_max_model_bytes")]
    pub max_model_bytes: u64,

    /// Default output format
    #[serde(default)]
    pub default_format: OutputFormat,
}

fn default_model_path() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_PATH)
}

fn default_max_model_bytes() -> u64 {
    DEFAULT_MAX_MODEL_BYTES
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            expected_sha256: None,
            max_model_bytes: default_max_model_bytes(),
            default_format: OutputFormat::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        match explicit {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                if let Some(path) = Self::default_path() {
                    builder = builder.add_source(
                        config::File::with_name(&path.to_string_lossy()).required(false),
                    );
                }
            }
        }

        let config = builder
            .add_source(config::Environment::with_prefix("CROP_YIELD").try_parsing(true))
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// Model loading settings derived from this configuration
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            path: self.model_path.clone(),
            expected_sha256: self.expected_sha256.clone(),
            max_model_bytes: self.max_model_bytes,
        }
    }

    /// Default config file stem, without extension
    fn default_path() -> Option<PathBuf> {
        let home = dirs_next::home_dir()?;
        Some(home.join(".config").join("crop-yield").join("config"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.model_path, PathBuf::from("crop_yield_model.onnx"));
        assert!(config.expected_sha256.is_none());
        assert_eq!(config.default_format, OutputFormat::Table);
        assert_eq!(config.model_config().max_model_bytes, DEFAULT_MAX_MODEL_BYTES);
    }

    #[test]
    fn test_load_explicit_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cyp.toml");
        fs::write(
            &path,
            "model_path = \"/models/yield.json\"\nmax_model_bytes = 2048\ndefault_format = \"json\"\n",
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.model_path, PathBuf::from("/models/yield.json"));
        assert_eq!(config.max_model_bytes, 2048);
        assert_eq!(config.default_format, OutputFormat::Json);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(AppConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
