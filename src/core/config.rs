//! Configuration types for the classification pipeline.
//!
//! This module holds the classifier configuration consumed by the builder
//! and the inference context handed to the network boundary on every
//! forward pass.

use crate::core::errors::ClassifyError;
use std::path::PathBuf;

/// Default input shape expected by the InceptionV4-style network.
pub const DEFAULT_INPUT_SHAPE: (u32, u32) = (299, 299);

/// Default mini-batch size for forward propagation.
pub const DEFAULT_BATCH_SIZE: usize = 2;

/// Configuration for the image classifier.
///
/// All fields are optional; `ImageClassifierBuilder` fills in defaults and
/// `validate` rejects inconsistent combinations before any model is loaded.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ClassifierConfig {
    /// Path to the pretrained ONNX model file.
    pub model_path: Option<PathBuf>,
    /// Path to the label table file (one class name per line).
    pub labels_path: Option<PathBuf>,
    /// Input shape the encoder and model expect, as (width, height).
    pub input_shape: Option<(u32, u32)>,
    /// Number of images per forward-propagation mini-batch.
    pub batch_size: Option<usize>,
    /// Number of top predictions to keep per image.
    pub topk: Option<usize>,
}

impl ClassifierConfig {
    /// Creates a new configuration with default settings.
    pub fn new() -> Self {
        Self {
            model_path: None,
            labels_path: None,
            input_shape: Some(DEFAULT_INPUT_SHAPE),
            batch_size: Some(DEFAULT_BATCH_SIZE),
            topk: Some(1),
        }
    }

    /// Validates the configuration.
    ///
    /// # Returns
    ///
    /// Ok if the configuration is valid, or a ClassifyError describing the
    /// first invalid field.
    pub fn validate(&self) -> Result<(), ClassifyError> {
        if self.model_path.is_none() {
            return Err(ClassifyError::config_error("model_path is required"));
        }

        if self.labels_path.is_none() {
            return Err(ClassifyError::config_error("labels_path is required"));
        }

        if let Some((width, height)) = self.input_shape {
            if width == 0 || height == 0 {
                return Err(ClassifyError::config_error(format!(
                    "input_shape dimensions must be greater than 0, got {width} x {height}"
                )));
            }
        }

        if let Some(batch_size) = self.batch_size {
            if batch_size == 0 {
                return Err(ClassifyError::config_error(
                    "batch_size must be greater than 0",
                ));
            }
        }

        if let Some(topk) = self.topk {
            if topk == 0 {
                return Err(ClassifyError::config_error("topk must be greater than 0"));
            }
        }

        Ok(())
    }
}

/// Runtime context handed to the network on every forward pass.
///
/// Mirrors the inference configuration the network boundary expects: the
/// batch cardinality and whether the pass runs in training mode. The demo
/// only ever predicts, so the training flag stays false.
#[derive(Debug, Clone, Copy)]
pub struct InferenceContext {
    /// Number of examples in the batch being propagated.
    pub batch_size: usize,
    /// Whether the forward pass runs in training mode.
    pub training: bool,
}

impl InferenceContext {
    /// Creates a prediction (non-training) context for the given batch size.
    pub fn for_prediction(batch_size: usize) -> Self {
        Self {
            batch_size,
            training: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_config() -> ClassifierConfig {
        ClassifierConfig {
            model_path: Some(PathBuf::from("model.onnx")),
            labels_path: Some(PathBuf::from("labels.txt")),
            ..ClassifierConfig::new()
        }
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(complete_config().validate().is_ok());
    }

    #[test]
    fn test_validate_requires_model_path() {
        let config = ClassifierConfig::new();
        assert!(matches!(
            config.validate(),
            Err(ClassifyError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let config = ClassifierConfig {
            batch_size: Some(0),
            ..complete_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_input_dimension() {
        let config = ClassifierConfig {
            input_shape: Some((0, 299)),
            ..complete_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_round_trips_through_serde() {
        let config = complete_config();
        let json = serde_json::to_string(&config).unwrap();
        let back: ClassifierConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.input_shape, Some(DEFAULT_INPUT_SHAPE));
        assert_eq!(back.batch_size, Some(DEFAULT_BATCH_SIZE));
    }

    #[test]
    fn test_prediction_context_is_not_training() {
        let ctx = InferenceContext::for_prediction(4);
        assert_eq!(ctx.batch_size, 4);
        assert!(!ctx.training);
    }
}
