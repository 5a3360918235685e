//! # InceptionV4 Demo
//!
//! A demonstration pipeline that classifies a directory of images with a
//! pretrained InceptionV4-style ONNX model and reports the top predicted
//! label per image.
//!
//! ## Components
//!
//! - **Feature encoding**: convert fixed-size RGB images into the
//!   flattened, channel-planar feature vectors the network expects
//! - **Batch assembly**: stack feature vectors into feature-major
//!   mini-batches
//! - **Inference**: forward-propagate batches through ONNX Runtime
//! - **Reporting**: argmax over per-class probabilities plus label lookup
//!
//! ## Modules
//!
//! * [`core`] - Error handling, configuration, and batch utilities
//! * [`dataset`] - Directory scanning and image loading
//! * [`encoder`] - Image-to-feature-vector encoding
//! * [`inference`] - The network boundary and its ONNX Runtime backend
//! * [`labels`] - Class label lookup
//! * [`predictor`] - The wired classification pipeline
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use inceptionv4_demo::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let classifier = ImageClassifierBuilder::new()
//!     .model_path("models/inceptionv4.onnx")
//!     .labels_path("models/labels.txt")
//!     .input_shape((299, 299))
//!     .batch_size(2)
//!     .build()?;
//!
//! for prediction in classifier.classify_dir(Path::new("test_images"))? {
//!     if let Some((label, probability)) = prediction.top1() {
//!         println!("Predicted : '{}' with probability {}", label, probability);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod dataset;
pub mod encoder;
pub mod inference;
pub mod labels;
pub mod predictor;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use inceptionv4_demo::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{ClassifierConfig, ClassifyError, ClassifyResult};
    pub use crate::dataset::{load_image, ImageDirectoryDataset};
    pub use crate::encoder::ImageFeatureEncoder;
    pub use crate::inference::Network;
    pub use crate::labels::LabelTable;
    pub use crate::predictor::{ImageClassifier, ImageClassifierBuilder, Prediction};
}
