//! Error types for the classification pipeline.
//!
//! This module defines the error type shared by every stage of the demo,
//! from image loading through feature encoding, batch assembly, inference,
//! and reporting, together with utility constructors for attaching context.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Enum representing different stages of processing in the pipeline.
///
/// This enum is used to identify which stage of the pipeline an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessingStage {
    /// Error occurred while encoding an image into a feature vector.
    Encoding,
    /// Error occurred while assembling feature vectors into a batch.
    BatchAssembly,
    /// Error occurred during post-processing of network output.
    PostProcessing,
    /// Generic processing error.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Encoding => write!(f, "encoding"),
            ProcessingStage::BatchAssembly => write!(f, "batch assembly"),
            ProcessingStage::PostProcessing => write!(f, "post-processing"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// Enum representing the errors that can occur in the classification pipeline.
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// Error occurred while loading an image.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// An image did not match the dimensions the encoder was configured with.
    ///
    /// The encoder never resizes or crops; the image must already be the
    /// configured size.
    #[error(
        "image must be {expected_width} x {expected_height} pixels, got {actual_width} x {actual_height}"
    )]
    InvalidDimensions {
        /// The width the encoder was configured with.
        expected_width: u32,
        /// The height the encoder was configured with.
        expected_height: u32,
        /// The width of the offending image.
        actual_width: u32,
        /// The height of the offending image.
        actual_height: u32,
    },

    /// Error occurred during processing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// A predicted class index has no entry in the label table.
    #[error("label index {index} out of range for table of {len} labels")]
    LabelOutOfRange {
        /// The predicted class index.
        index: usize,
        /// The number of labels in the table.
        len: usize,
    },

    /// Error occurred while loading the ONNX model.
    #[error("failed to load model from '{path}'")]
    ModelLoad {
        /// The path the model was loaded from.
        path: PathBuf,
        /// The underlying ONNX Runtime error.
        #[source]
        source: ort::Error,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Convenient result alias for pipeline operations.
pub type ClassifyResult<T> = Result<T, ClassifyError>;

impl ClassifyError {
    /// Creates a ClassifyError for a dimension-mismatched image.
    ///
    /// # Arguments
    ///
    /// * `expected` - The (width, height) the encoder was configured with.
    /// * `actual` - The (width, height) of the offending image.
    pub fn invalid_dimensions(expected: (u32, u32), actual: (u32, u32)) -> Self {
        Self::InvalidDimensions {
            expected_width: expected.0,
            expected_height: expected.1,
            actual_width: actual.0,
            actual_height: actual.1,
        }
    }

    /// Creates a ClassifyError for batch assembly operations.
    pub fn batch_assembly(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind: ProcessingStage::BatchAssembly,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a ClassifyError for post-processing operations.
    pub fn post_processing(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind: ProcessingStage::PostProcessing,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a ClassifyError for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a ClassifyError for configuration errors.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates a ClassifyError for a model that could not be loaded.
    pub fn model_load(path: &Path, source: ort::Error) -> Self {
        Self::ModelLoad {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<image::ImageError> for ClassifyError {
    fn from(error: image::ImageError) -> Self {
        Self::ImageLoad(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_dimensions_message_names_both_sizes() {
        let err = ClassifyError::invalid_dimensions((299, 299), (128, 64));
        let message = err.to_string();
        assert!(message.contains("299 x 299"));
        assert!(message.contains("128 x 64"));
    }

    #[test]
    fn test_label_out_of_range_message() {
        let err = ClassifyError::LabelOutOfRange {
            index: 1000,
            len: 1000,
        };
        assert!(err.to_string().contains("1000 labels"));
    }
}
