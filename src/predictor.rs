//! The image classifier pipeline.
//!
//! This module wires the stages of the demo together in dependency order:
//! load images from disk, encode each into a feature vector, assemble
//! feature-major mini-batches, forward-propagate them through the network
//! boundary, and rank the resulting per-class probabilities into
//! predictions. Construction is plain and explicit; the builder only fills
//! defaults and validates.

use crate::core::{
    BatchSampler, ClassifierConfig, ClassifyError, FeatureBatch, InferenceContext, Tensor2D,
    DEFAULT_BATCH_SIZE, DEFAULT_INPUT_SHAPE,
};
use crate::dataset::{self, ImageDirectoryDataset};
use crate::encoder::ImageFeatureEncoder;
use crate::inference::{Network, OrtNetwork};
use crate::labels::LabelTable;
use image::RgbImage;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// The classification result for one image.
///
/// `class_ids`, `scores`, and `labels` are parallel vectors sorted by
/// descending probability, truncated to the configured top-k.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Path of the classified image.
    pub path: Arc<str>,
    /// Predicted class indices, best first.
    pub class_ids: Vec<usize>,
    /// Probabilities corresponding to `class_ids`.
    pub scores: Vec<f32>,
    /// Label names corresponding to `class_ids`.
    pub labels: Vec<Arc<str>>,
}

impl Prediction {
    /// Returns the top predicted label and its probability.
    pub fn top1(&self) -> Option<(&str, f32)> {
        match (self.labels.first(), self.scores.first()) {
            (Some(label), Some(&score)) => Some((label.as_ref(), score)),
            _ => None,
        }
    }
}

/// Ranks class scores in descending order and keeps the best `k`.
///
/// The sort is stable, so equal scores keep their index order and the
/// leading entry is the argmax with first-occurrence tie breaking.
pub fn rank_top_k(scores: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut indexed: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    indexed.truncate(k);
    indexed
}

/// Classifies directories of images with a pretrained network.
///
/// Generic over the network boundary so tests can substitute a mock; the
/// builder produces the ONNX-backed `ImageClassifier<OrtNetwork>`.
#[derive(Debug)]
pub struct ImageClassifier<N: Network> {
    encoder: ImageFeatureEncoder,
    batch_sampler: BatchSampler,
    feature_batch: FeatureBatch,
    network: N,
    labels: LabelTable,
    topk: usize,
}

impl<N: Network> ImageClassifier<N> {
    /// Creates a classifier over an already-constructed network and label table.
    ///
    /// Only the numeric configuration fields are consulted; the model and
    /// label paths belong to the builder.
    pub fn with_network(
        config: &ClassifierConfig,
        network: N,
        labels: LabelTable,
    ) -> Result<Self, ClassifyError> {
        let (width, height) = config.input_shape.unwrap_or(DEFAULT_INPUT_SHAPE);
        let batch_size = config.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
        let topk = config.topk.unwrap_or(1);

        if batch_size == 0 {
            return Err(ClassifyError::config_error(
                "batch_size must be greater than 0",
            ));
        }
        if topk == 0 {
            return Err(ClassifyError::config_error("topk must be greater than 0"));
        }

        Ok(Self {
            encoder: ImageFeatureEncoder::new(width, height)?,
            batch_sampler: BatchSampler::new(batch_size),
            feature_batch: FeatureBatch::new(),
            network,
            labels,
            topk,
        })
    }

    /// Returns the encoder this classifier feeds the network with.
    pub fn encoder(&self) -> &ImageFeatureEncoder {
        &self.encoder
    }

    /// Classifies every matching image under a directory.
    ///
    /// A missing directory or one with no matching files yields an empty
    /// result; a dimension-mismatched image aborts the whole run.
    pub fn classify_dir(&self, dir: &Path) -> Result<Vec<Prediction>, ClassifyError> {
        let dataset = ImageDirectoryDataset::scan(dir);
        if dataset.is_empty() {
            info!("No images found under {}", dir.display());
            return Ok(Vec::new());
        }
        self.classify_paths(&dataset.paths())
    }

    /// Classifies the given image files, in order, in mini-batches.
    pub fn classify_paths<P: AsRef<Path> + Send + Sync>(
        &self,
        paths: &[P],
    ) -> Result<Vec<Prediction>, ClassifyError> {
        let mut predictions = Vec::with_capacity(paths.len());
        for chunk in self.batch_sampler.batches(paths) {
            let images = dataset::load_images_batch(chunk)?;
            for path in chunk {
                info!("Loaded image: {}", path.as_ref().display());
            }
            predictions.extend(self.classify_batch(chunk, &images)?);
        }
        Ok(predictions)
    }

    /// Encodes, forward-propagates, and ranks one mini-batch.
    fn classify_batch<P: AsRef<Path>>(
        &self,
        paths: &[P],
        images: &[RgbImage],
    ) -> Result<Vec<Prediction>, ClassifyError> {
        let mut vectors = Vec::with_capacity(images.len());
        for image in images {
            vectors.push(self.encoder.encode(image)?);
        }

        let batch = self
            .feature_batch
            .assemble(&vectors, self.encoder.feature_count())?;
        let ctx = InferenceContext::for_prediction(images.len());

        info!(
            "Forward propagating {} images through the network...",
            images.len()
        );
        let probabilities = self.network.forward(&batch, &ctx)?;
        if probabilities.ncols() != images.len() {
            return Err(ClassifyError::invalid_input(format!(
                "network returned {} probability columns for a batch of {} images",
                probabilities.ncols(),
                images.len()
            )));
        }

        self.rank_batch(paths, &probabilities)
    }

    /// Converts a feature-major probability tensor into per-image predictions.
    fn rank_batch<P: AsRef<Path>>(
        &self,
        paths: &[P],
        probabilities: &Tensor2D,
    ) -> Result<Vec<Prediction>, ClassifyError> {
        let mut predictions = Vec::with_capacity(paths.len());
        for (column, path) in paths.iter().enumerate() {
            let scores: Vec<f32> = probabilities.column(column).to_vec();
            let ranked = rank_top_k(&scores, self.topk);
            if ranked.is_empty() {
                return Err(ClassifyError::invalid_input(
                    "network produced an empty probability column",
                ));
            }

            let mut class_ids = Vec::with_capacity(ranked.len());
            let mut top_scores = Vec::with_capacity(ranked.len());
            let mut labels = Vec::with_capacity(ranked.len());
            for (class_id, score) in ranked {
                labels.push(Arc::from(self.labels.get(class_id)?));
                class_ids.push(class_id);
                top_scores.push(score);
            }

            predictions.push(Prediction {
                path: Arc::from(path.as_ref().to_string_lossy().as_ref()),
                class_ids,
                scores: top_scores,
                labels,
            });
        }
        Ok(predictions)
    }
}

/// Builder for the ONNX-backed image classifier.
pub struct ImageClassifierBuilder {
    config: ClassifierConfig,
}

impl ImageClassifierBuilder {
    /// Creates a builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: ClassifierConfig::new(),
        }
    }

    /// Sets the path of the pretrained ONNX model.
    pub fn model_path(mut self, model_path: impl Into<std::path::PathBuf>) -> Self {
        self.config.model_path = Some(model_path.into());
        self
    }

    /// Sets the path of the label table file.
    pub fn labels_path(mut self, labels_path: impl Into<std::path::PathBuf>) -> Self {
        self.config.labels_path = Some(labels_path.into());
        self
    }

    /// Sets the input shape as (width, height).
    pub fn input_shape(mut self, input_shape: (u32, u32)) -> Self {
        self.config.input_shape = Some(input_shape);
        self
    }

    /// Sets the mini-batch size for forward propagation.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = Some(batch_size);
        self
    }

    /// Sets the number of top predictions to keep per image.
    pub fn topk(mut self, topk: usize) -> Self {
        self.config.topk = Some(topk);
        self
    }

    /// Validates the configuration, loads the label table and the model,
    /// and builds the classifier.
    pub fn build(self) -> Result<ImageClassifier<OrtNetwork>, ClassifyError> {
        self.config.validate()?;

        let model_path = self
            .config
            .model_path
            .as_deref()
            .ok_or_else(|| ClassifyError::config_error("model_path is required"))?;
        let labels_path = self
            .config
            .labels_path
            .as_deref()
            .ok_or_else(|| ClassifyError::config_error("labels_path is required"))?;
        let input_shape = self.config.input_shape.unwrap_or(DEFAULT_INPUT_SHAPE);

        let labels = LabelTable::from_file(labels_path)?;
        let network = OrtNetwork::from_file(model_path, input_shape)?;

        ImageClassifier::with_network(&self.config, network, labels)
    }
}

impl Default for ImageClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::fs;

    /// Mock network that returns a fixed probability column per example.
    #[derive(Debug)]
    struct FixedNetwork {
        column: Vec<f32>,
    }

    impl Network for FixedNetwork {
        fn forward(
            &self,
            batch: &Tensor2D,
            ctx: &InferenceContext,
        ) -> Result<Tensor2D, ClassifyError> {
            assert!(!ctx.training);
            assert_eq!(ctx.batch_size, batch.ncols());

            let classes = self.column.len();
            let batch_size = batch.ncols();
            let mut data = vec![0.0f32; classes * batch_size];
            for row in 0..classes {
                for column in 0..batch_size {
                    data[row * batch_size + column] = self.column[row];
                }
            }
            Ok(Tensor2D::from_shape_vec((classes, batch_size), data).unwrap())
        }
    }

    /// Mock network that fails the test if the pipeline ever reaches it.
    #[derive(Debug)]
    struct UnreachableNetwork;

    impl Network for UnreachableNetwork {
        fn forward(
            &self,
            _batch: &Tensor2D,
            _ctx: &InferenceContext,
        ) -> Result<Tensor2D, ClassifyError> {
            panic!("forward must not be called for an empty dataset");
        }
    }

    fn animal_labels() -> LabelTable {
        LabelTable::from_labels(vec![
            "cat".to_string(),
            "dog".to_string(),
            "bird".to_string(),
        ])
    }

    fn small_config() -> ClassifierConfig {
        ClassifierConfig {
            input_shape: Some((2, 2)),
            batch_size: Some(2),
            topk: Some(1),
            ..ClassifierConfig::new()
        }
    }

    fn write_white_jpg(path: &Path) {
        let image = RgbImage::from_pixel(2, 2, Rgb([255, 255, 255]));
        image.save(path).unwrap();
    }

    #[test]
    fn test_rank_top_k_orders_descending() {
        let ranked = rank_top_k(&[0.1, 0.7, 0.2], 3);
        assert_eq!(ranked[0], (1, 0.7));
        assert_eq!(ranked[1], (2, 0.2));
        assert_eq!(ranked[2], (0, 0.1));
    }

    #[test]
    fn test_rank_top_k_tie_keeps_first_occurrence() {
        let ranked = rank_top_k(&[0.5, 0.5, 0.1], 1);
        assert_eq!(ranked[0].0, 0);
    }

    #[test]
    fn test_rank_top_k_truncates() {
        let ranked = rank_top_k(&[0.3, 0.4, 0.2, 0.1], 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0, 1);
    }

    #[test]
    fn test_argmax_reporting() {
        let dir = tempfile::tempdir().unwrap();
        let class_dir = dir.path().join("pets");
        fs::create_dir(&class_dir).unwrap();
        write_white_jpg(&class_dir.join("sample.jpg"));

        let classifier = ImageClassifier::with_network(
            &small_config(),
            FixedNetwork {
                column: vec![0.1, 0.7, 0.2],
            },
            animal_labels(),
        )
        .unwrap();

        let predictions = classifier.classify_dir(dir.path()).unwrap();
        assert_eq!(predictions.len(), 1);
        let (label, probability) = predictions[0].top1().unwrap();
        assert_eq!(label, "dog");
        assert!((probability - 0.7).abs() < f32::EPSILON);
        assert_eq!(predictions[0].class_ids[0], 1);
    }

    #[test]
    fn test_empty_directory_produces_no_predictions() {
        let dir = tempfile::tempdir().unwrap();

        let classifier =
            ImageClassifier::with_network(&small_config(), UnreachableNetwork, animal_labels())
                .unwrap();

        let predictions = classifier.classify_dir(dir.path()).unwrap();
        assert!(predictions.is_empty());
    }

    #[test]
    fn test_mini_batching_preserves_input_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.jpg", "b.jpg", "c.jpg"] {
            write_white_jpg(&dir.path().join(name));
        }

        let classifier = ImageClassifier::with_network(
            &small_config(),
            FixedNetwork {
                column: vec![0.2, 0.5, 0.3],
            },
            animal_labels(),
        )
        .unwrap();

        // batch_size 2 splits three images into two forward passes
        let predictions = classifier.classify_dir(dir.path()).unwrap();
        assert_eq!(predictions.len(), 3);
        let names: Vec<_> = predictions
            .iter()
            .map(|p| p.path.rsplit('/').next().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn test_dimension_mismatch_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let image = RgbImage::from_pixel(3, 3, Rgb([0, 0, 0]));
        image.save(dir.path().join("wrong_size.jpg")).unwrap();

        let classifier =
            ImageClassifier::with_network(&small_config(), UnreachableNetwork, animal_labels())
                .unwrap();

        let result = classifier.classify_dir(dir.path());
        assert!(matches!(
            result,
            Err(ClassifyError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_topk_supplement_returns_ranked_labels() {
        let dir = tempfile::tempdir().unwrap();
        write_white_jpg(&dir.path().join("img.jpg"));

        let config = ClassifierConfig {
            topk: Some(2),
            ..small_config()
        };
        let classifier = ImageClassifier::with_network(
            &config,
            FixedNetwork {
                column: vec![0.1, 0.7, 0.2],
            },
            animal_labels(),
        )
        .unwrap();

        let predictions = classifier.classify_dir(dir.path()).unwrap();
        assert_eq!(predictions[0].labels.len(), 2);
        assert_eq!(predictions[0].labels[0].as_ref(), "dog");
        assert_eq!(predictions[0].labels[1].as_ref(), "bird");
    }

    #[test]
    fn test_out_of_range_prediction_surfaces_label_error() {
        let dir = tempfile::tempdir().unwrap();
        write_white_jpg(&dir.path().join("img.jpg"));

        // Four probability rows against a three-entry label table
        let classifier = ImageClassifier::with_network(
            &small_config(),
            FixedNetwork {
                column: vec![0.1, 0.1, 0.1, 0.7],
            },
            animal_labels(),
        )
        .unwrap();

        let result = classifier.classify_dir(dir.path());
        assert!(matches!(
            result,
            Err(ClassifyError::LabelOutOfRange { index: 3, len: 3 })
        ));
    }
}
