//! The network boundary and its ONNX Runtime implementation.
//!
//! The pretrained classification network is an external collaborator: this
//! crate only hands it a feature-major batch and an inference context, and
//! receives a feature-major batch of per-class probabilities back. The
//! `Network` trait captures that contract; `OrtNetwork` implements it over
//! a pretrained ONNX model executed through ONNX Runtime.

use crate::core::{ClassifyError, InferenceContext, Tensor2D, Tensor4D};
use ndarray::ArrayView2;
use ort::{
    session::Session,
    value::{TensorRef, ValueType},
};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// The forward-inference boundary of the pretrained network.
///
/// `batch` is feature-major: one column per example. Implementations must
/// return a probability tensor with the same number of columns.
pub trait Network {
    /// Forward-propagates a batch and returns per-class probabilities,
    /// one column per example.
    fn forward(&self, batch: &Tensor2D, ctx: &InferenceContext) -> Result<Tensor2D, ClassifyError>;
}

/// Loads an ONNX Runtime session from a model file.
///
/// # Errors
///
/// Returns a `ModelLoad` error naming the path if the session cannot be
/// created.
pub fn load_session(model_path: impl AsRef<Path>) -> Result<Session, ClassifyError> {
    let path = model_path.as_ref();
    let session = Session::builder()
        .and_then(|b| b.commit_from_file(path))
        .map_err(|e| ClassifyError::model_load(path, e))?;
    Ok(session)
}

/// Converts a feature-major batch into the NCHW input tensor the model takes.
///
/// Each column is already one plane-flattened image of length
/// `3 * height * width`; the reshape only introduces the batch and channel
/// axes.
fn feature_major_to_nchw(
    batch: &Tensor2D,
    width: u32,
    height: u32,
) -> Result<Tensor4D, ClassifyError> {
    let (features, batch_size) = batch.dim();
    let expected = (width * height * 3) as usize;
    if features != expected {
        return Err(ClassifyError::invalid_input(format!(
            "batch has {features} features per column but a {width} x {height} input requires {expected}"
        )));
    }

    let mut data = vec![0.0f32; batch_size * features];
    for column in 0..batch_size {
        for row in 0..features {
            data[column * features + row] = batch[[row, column]];
        }
    }

    Tensor4D::from_shape_vec(
        (batch_size, 3, height as usize, width as usize),
        data,
    )
    .map_err(ClassifyError::Tensor)
}

/// A pretrained classification network backed by one ONNX Runtime session.
pub struct OrtNetwork {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    input_shape: (u32, u32),
    model_path: PathBuf,
}

impl std::fmt::Debug for OrtNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtNetwork")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("input_shape", &self.input_shape)
            .field("model_path", &self.model_path)
            .finish()
    }
}

impl OrtNetwork {
    /// Creates a network from a pretrained ONNX model file.
    ///
    /// Input and output tensor names are discovered from the session. When
    /// the model declares a static input shape, it is checked against
    /// `input_shape` so a mismatched model fails at construction instead of
    /// at the first forward pass.
    ///
    /// # Arguments
    ///
    /// * `model_path` - Path to the ONNX model file.
    /// * `input_shape` - The (width, height) the model expects.
    pub fn from_file(model_path: &Path, input_shape: (u32, u32)) -> Result<Self, ClassifyError> {
        let session = load_session(model_path)?;

        let input = session.inputs.first().ok_or_else(|| {
            ClassifyError::invalid_input(format!(
                "model '{}' declares no inputs",
                model_path.display()
            ))
        })?;
        let input_name = input.name.clone();

        if let ValueType::Tensor { shape, .. } = &input.input_type {
            let dims: Vec<i64> = shape.iter().copied().collect();
            Self::check_declared_shape(&dims, input_shape, model_path)?;
        }

        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| {
                ClassifyError::invalid_input(format!(
                    "model '{}' declares no outputs",
                    model_path.display()
                ))
            })?;

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            input_shape,
            model_path: model_path.to_path_buf(),
        })
    }

    /// Returns the model path associated with this network.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Checks a declared NCHW input shape against the configured one.
    ///
    /// Dynamic dimensions (negative) are not checked.
    fn check_declared_shape(
        dims: &[i64],
        input_shape: (u32, u32),
        model_path: &Path,
    ) -> Result<(), ClassifyError> {
        if dims.len() != 4 {
            return Ok(());
        }

        let (width, height) = input_shape;
        let declared = [
            (dims[1], 3i64),
            (dims[2], height as i64),
            (dims[3], width as i64),
        ];
        for (declared_dim, configured) in declared {
            if declared_dim > 0 && declared_dim != configured {
                return Err(ClassifyError::config_error(format!(
                    "model '{}' declares input shape {:?} but the pipeline is configured for 3 x {} x {}",
                    model_path.display(),
                    dims,
                    height,
                    width
                )));
            }
        }
        Ok(())
    }
}

impl Network for OrtNetwork {
    fn forward(&self, batch: &Tensor2D, ctx: &InferenceContext) -> Result<Tensor2D, ClassifyError> {
        if ctx.training {
            return Err(ClassifyError::invalid_input(
                "the network runs inference only; training mode is not supported",
            ));
        }

        let batch_size = batch.ncols();
        if batch_size == 0 {
            return Ok(Tensor2D::zeros((0, 0)));
        }

        let input = feature_major_to_nchw(batch, self.input_shape.0, self.input_shape.1)?;
        let input_tensor = TensorRef::from_array_view(input.view())?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifyError::invalid_input("failed to acquire session lock"))?;
        let outputs = session.run(inputs)?;

        let (output_shape, output_data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()?;

        if output_shape.len() != 2 {
            return Err(ClassifyError::invalid_input(format!(
                "expected a 2D probability tensor, got {}D with shape {:?}",
                output_shape.len(),
                output_shape
            )));
        }

        let rows = output_shape[0] as usize;
        let classes = output_shape[1] as usize;
        if rows != batch_size {
            return Err(ClassifyError::invalid_input(format!(
                "network returned {rows} probability rows for a batch of {batch_size} examples"
            )));
        }
        if output_data.len() != rows * classes {
            return Err(ClassifyError::invalid_input(format!(
                "probability tensor data size mismatch: expected {}, got {}",
                rows * classes,
                output_data.len()
            )));
        }

        let view =
            ArrayView2::from_shape((rows, classes), output_data).map_err(ClassifyError::Tensor)?;
        // Back to feature-major: classes down the rows, one column per example.
        Ok(view.t().to_owned())
    }
}
