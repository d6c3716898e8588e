//! ONNX inference using tract
//!
//! Runs a pre-fitted regression pipeline exported to ONNX. The graph takes
//! a single `f32[1, 5]` input in canonical column order and returns the
//! predicted yield as the first element of its first output.

use super::{InferenceCounters, InferenceStats, Predictor};
use crate::error::PredictionError;
use crate::models::{Field, InputRow};
use anyhow::{Context, Result};
use std::time::Instant;
use tract_onnx::prelude::*;

/// Number of input features expected by the model
const NUM_FEATURES: usize = Field::ALL.len();

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX-based predictor using tract for lightweight inference
pub struct OnnxPredictor {
    model: TractModel,
    model_version: String,
    counters: InferenceCounters,
}

impl OnnxPredictor {
    /// Create a new predictor from model bytes
    pub fn new(model_bytes: &[u8], model_version: impl Into<String>) -> Result<Self> {
        let model = Self::load_model(model_bytes)?;
        Ok(Self {
            model,
            model_version: model_version.into(),
            counters: InferenceCounters::default(),
        })
    }

    /// Load and optimize an ONNX model from bytes
    fn load_model(model_bytes: &[u8]) -> Result<TractModel> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, NUM_FEATURES]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;
        Ok(model)
    }

    /// Convert an input row to a `[1, NUM_FEATURES]` tensor
    fn row_to_tensor(row: &InputRow) -> Result<Tensor> {
        let data = row.to_features().to_vec();
        let array = tract_ndarray::Array2::from_shape_vec((1, NUM_FEATURES), data)
            .context("Failed to shape input tensor")?;
        Ok(array.into())
    }

    /// Extract the scalar prediction from the model output tensor
    fn tensor_to_value(output: &Tensor) -> Result<f64> {
        let view = output.to_array_view::<f32>()?;
        let value = view
            .iter()
            .next()
            .copied()
            .context("Model returned an empty output tensor")?;
        Ok(value as f64)
    }

    fn run(&self, row: &InputRow) -> Result<f64> {
        let input = Self::row_to_tensor(row)?;
        let result = self.model.run(tvec!(input.into()))?;
        let output = result.first().context("No output from model")?;
        Self::tensor_to_value(output)
    }
}

impl Predictor for OnnxPredictor {
    fn predict(&self, row: &InputRow) -> Result<f64, PredictionError> {
        let start = Instant::now();
        let value = self
            .run(row)
            .map_err(|e| PredictionError::new(&self.model_version, format!("{e:#}")))?;
        self.counters.record(start.elapsed());
        Ok(value)
    }

    fn model_version(&self) -> String {
        self.model_version.clone()
    }

    fn stats(&self) -> Option<InferenceStats> {
        Some(self.counters.snapshot())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use prost::Message;
    use tract_onnx::pb;

    const FLOAT: i32 = pb::tensor_proto::DataType::Float as i32;

    fn tensor_type(dims: &[i64]) -> Option<pb::TypeProto> {
        let dim = dims
            .iter()
            .map(|&d| pb::tensor_shape_proto::Dimension {
                value: Some(pb::tensor_shape_proto::dimension::Value::DimValue(d)),
                ..Default::default()
            })
            .collect();
        Some(pb::TypeProto {
            value: Some(pb::type_proto::Value::TensorType(pb::type_proto::Tensor {
                elem_type: FLOAT,
                shape: Some(pb::TensorShapeProto { dim }),
            })),
            ..Default::default()
        })
    }

    /// Encoded graph computing `Y = X · W` for `X: f32[1,5]`, `W: f32[5,1]`
    pub(crate) fn linear_onnx_bytes(weights: [f32; NUM_FEATURES]) -> Vec<u8> {
        let graph = pb::GraphProto {
            name: "crop_yield".to_string(),
            node: vec![pb::NodeProto {
                input: vec!["X".to_string(), "W".to_string()],
                output: vec!["Y".to_string()],
                op_type: "MatMul".to_string(),
                ..Default::default()
            }],
            initializer: vec![pb::TensorProto {
                name: "W".to_string(),
                dims: vec![NUM_FEATURES as i64, 1],
                data_type: FLOAT,
                float_data: weights.to_vec(),
                ..Default::default()
            }],
            input: vec![pb::ValueInfoProto {
                name: "X".to_string(),
                r#type: tensor_type(&[1, NUM_FEATURES as i64]),
                ..Default::default()
            }],
            output: vec![pb::ValueInfoProto {
                name: "Y".to_string(),
                r#type: tensor_type(&[1, 1]),
                ..Default::default()
            }],
            ..Default::default()
        };
        pb::ModelProto {
            ir_version: 8,
            opset_import: vec![pb::OperatorSetIdProto {
                domain: String::new(),
                version: 13,
            }],
            graph: Some(graph),
            ..Default::default()
        }
        .encode_to_vec()
    }

    /// Weights in column order giving 3.8 t/ha for the form defaults
    pub(crate) const STUB_WEIGHTS: [f32; NUM_FEATURES] = [0.002, 0.0, 1.5, 1.2, 0.0];

    #[test]
    fn test_predicts_with_onnx_graph() {
        let predictor = OnnxPredictor::new(&linear_onnx_bytes(STUB_WEIGHTS), "onnx-test").unwrap();

        let value = predictor.predict(&InputRow::default()).unwrap();
        assert!((value - 3.8).abs() < 1e-5, "got {}", value);

        let dry = InputRow::builder()
            .rainfall_mm(0.0)
            .irrigation_used(false)
            .build();
        let value = predictor.predict(&dry).unwrap();
        assert!((value - 1.5).abs() < 1e-5, "got {}", value);

        assert_eq!(predictor.model_version(), "onnx-test");
        assert_eq!(predictor.stats().unwrap().total_inferences, 2);
    }

    #[test]
    fn test_rejects_invalid_model_bytes() {
        let err = OnnxPredictor::new(&[0xff; 16], "v1")
            .err()
            .expect("garbage bytes must not load");
        assert!(format!("{err:#}").contains("Failed to parse ONNX model"));
    }

    #[test]
    fn test_row_to_tensor_shape() {
        let tensor = OnnxPredictor::row_to_tensor(&InputRow::default()).unwrap();
        assert_eq!(tensor.shape(), &[1, NUM_FEATURES]);
        let view = tensor.to_array_view::<f32>().unwrap();
        let values: Vec<f32> = view.iter().copied().collect();
        assert_eq!(values, vec![550.0, 27.5, 1.0, 1.0, 105.0]);
    }

    #[test]
    fn test_tensor_to_value_takes_first_element() {
        let tensor: Tensor = tract_ndarray::arr2(&[[3.25f32]]).into();
        assert_eq!(OnnxPredictor::tensor_to_value(&tensor).unwrap(), 3.25);
    }

    #[test]
    fn test_tensor_to_value_rejects_empty_output() {
        let tensor: Tensor = tract_ndarray::Array2::<f32>::zeros((1, 0)).into();
        assert!(OnnxPredictor::tensor_to_value(&tensor).is_err());
    }
}
