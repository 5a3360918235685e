//! The core module of the classification pipeline.
//!
//! This module contains the fundamental pieces shared by the rest of the
//! crate:
//! - Batch handling and tensor aliases
//! - Configuration types and validation
//! - Error handling
//!
//! It also provides re-exports of commonly used types for convenience.

pub mod batch;
pub mod config;
pub mod errors;

pub use batch::{BatchSampler, FeatureBatch, Tensor2D, Tensor4D};
pub use config::{ClassifierConfig, InferenceContext, DEFAULT_BATCH_SIZE, DEFAULT_INPUT_SHAPE};
pub use errors::{ClassifyError, ClassifyResult, ProcessingStage};

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and formatting layer.
/// It's typically called at the start of an application to enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
