//! Batch handling for the classification pipeline.
//!
//! This module provides the tensor aliases used across the pipeline, a
//! sampler that chunks inputs into mini-batches, and the assembly step that
//! stacks per-image feature vectors into the feature-major matrix the
//! network consumes.

use crate::core::errors::ClassifyError;

/// A 2-dimensional tensor represented as a 2D array of f32 values.
pub type Tensor2D = ndarray::Array2<f32>;

/// A 4-dimensional tensor represented as a 4D array of f32 values.
pub type Tensor4D = ndarray::Array4<f32>;

/// A sampler that splits inputs into mini-batches of a fixed size.
///
/// The pipeline processes images in mini-batches; this struct owns the
/// chunking so the classifier never has to reason about batch boundaries.
#[derive(Debug)]
pub struct BatchSampler {
    /// The size of each batch.
    batch_size: usize,
}

impl BatchSampler {
    /// Creates a new BatchSampler with the specified batch size.
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size }
    }

    /// Returns the batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Creates an iterator over batches of data.
    ///
    /// A batch size of zero yields no batches.
    pub fn batches<'a, T>(&self, data: &'a [T]) -> impl Iterator<Item = &'a [T]> {
        if self.batch_size == 0 {
            data.chunks(1).take(0)
        } else {
            data.chunks(self.batch_size).take(usize::MAX)
        }
    }
}

/// Assembles per-image feature vectors into a feature-major batch tensor.
///
/// Each feature vector occupies one *column* of the output: the result has
/// shape `(feature_count, batch_size)`. This is the orientation the network
/// boundary consumes.
#[derive(Debug, Default)]
pub struct FeatureBatch;

impl FeatureBatch {
    /// Creates a new FeatureBatch instance.
    pub fn new() -> Self {
        FeatureBatch
    }

    /// Validates that every vector has exactly `feature_count` elements.
    ///
    /// # Arguments
    ///
    /// * `vectors` - The per-image feature vectors.
    /// * `feature_count` - The expected length of each vector.
    ///
    /// # Returns
    ///
    /// A Result indicating success or a ClassifyError if validation fails.
    pub fn validate_inputs(
        &self,
        vectors: &[Vec<f32>],
        feature_count: usize,
    ) -> Result<(), ClassifyError> {
        for (i, vector) in vectors.iter().enumerate() {
            if vector.len() != feature_count {
                return Err(ClassifyError::InvalidInput {
                    message: format!(
                        "Feature vector {} has {} elements but the batch requires {}",
                        i,
                        vector.len(),
                        feature_count
                    ),
                });
            }
        }
        Ok(())
    }

    /// Stacks the vectors into a `(feature_count, batch_size)` tensor.
    ///
    /// Vector `j` becomes column `j`; an empty input yields an empty
    /// `(feature_count, 0)` tensor.
    ///
    /// # Arguments
    ///
    /// * `vectors` - The per-image feature vectors.
    /// * `feature_count` - The expected length of each vector.
    ///
    /// # Returns
    ///
    /// A Result containing the feature-major batch tensor, or a
    /// ClassifyError if the vectors are inconsistent.
    pub fn assemble(
        &self,
        vectors: &[Vec<f32>],
        feature_count: usize,
    ) -> Result<Tensor2D, ClassifyError> {
        self.validate_inputs(vectors, feature_count)?;

        let batch_size = vectors.len();
        if batch_size == 0 {
            return Ok(Tensor2D::zeros((feature_count, 0)));
        }

        let mut data = vec![0.0f32; feature_count * batch_size];
        for (column, vector) in vectors.iter().enumerate() {
            for (row, &value) in vector.iter().enumerate() {
                data[row * batch_size + column] = value;
            }
        }

        Tensor2D::from_shape_vec((feature_count, batch_size), data)
            .map_err(|e| ClassifyError::batch_assembly("failed to create feature-major tensor", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_batch_columns_are_examples() -> Result<(), ClassifyError> {
        let batch = FeatureBatch::new();

        let v1 = vec![1.0, 2.0, 3.0];
        let v2 = vec![4.0, 5.0, 6.0];
        let tensor = batch.assemble(&[v1, v2], 3)?;

        assert_eq!(tensor.dim(), (3, 2));
        // First vector down column 0, second down column 1
        assert_eq!(tensor[[0, 0]], 1.0);
        assert_eq!(tensor[[1, 0]], 2.0);
        assert_eq!(tensor[[2, 0]], 3.0);
        assert_eq!(tensor[[0, 1]], 4.0);
        assert_eq!(tensor[[1, 1]], 5.0);
        assert_eq!(tensor[[2, 1]], 6.0);
        Ok(())
    }

    #[test]
    fn test_feature_batch_empty_input() -> Result<(), ClassifyError> {
        let batch = FeatureBatch::new();
        let tensor = batch.assemble(&[], 12)?;
        assert_eq!(tensor.dim(), (12, 0));
        Ok(())
    }

    #[test]
    fn test_feature_batch_rejects_length_mismatch() {
        let batch = FeatureBatch::new();
        let result = batch.assemble(&[vec![1.0, 2.0]], 3);
        assert!(matches!(result, Err(ClassifyError::InvalidInput { .. })));
    }

    #[test]
    fn test_batch_sampler_chunks() {
        let sampler = BatchSampler::new(2);
        let data = [1, 2, 3, 4, 5];
        let chunks: Vec<&[i32]> = sampler.batches(&data).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], &[1, 2]);
        assert_eq!(chunks[2], &[5]);
    }

    #[test]
    fn test_batch_sampler_zero_size_yields_nothing() {
        let sampler = BatchSampler::new(0);
        let data = [1, 2, 3];
        assert_eq!(sampler.batches(&data).count(), 0);
    }
}
