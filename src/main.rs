//! Classifies a directory of images with a pretrained InceptionV4-style
//! ONNX model and logs the top predicted label per image.
//!
//! Usage:
//! ```
//! cargo run -- --model-path <model.onnx> --labels-path <labels.txt> <images_dir>
//! ```

use clap::Parser;
use inceptionv4_demo::core::init_tracing;
use inceptionv4_demo::predictor::ImageClassifierBuilder;
use std::path::PathBuf;
use tracing::{error, info};

/// Command-line arguments for the classification demo
#[derive(Parser)]
#[command(name = "inceptionv4-demo")]
#[command(about = "Classifies a directory of images with a pretrained InceptionV4-style model")]
struct Args {
    /// Directory of images to classify (one subdirectory per class)
    images_dir: PathBuf,

    /// Path to the pretrained ONNX model file
    #[arg(short, long)]
    model_path: PathBuf,

    /// Path to the label table file, one class name per line
    #[arg(short, long)]
    labels_path: PathBuf,

    /// Number of images per forward-propagation mini-batch
    #[arg(long, default_value_t = 2)]
    batch_size: usize,

    /// Square input size the model expects
    #[arg(long, default_value_t = 299)]
    input_size: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args = Args::parse();

    if !args.model_path.exists() {
        error!("Model file not found: {}", args.model_path.display());
        return Err("Model file not found".into());
    }
    if !args.labels_path.exists() {
        error!("Label file not found: {}", args.labels_path.display());
        return Err("Label file not found".into());
    }

    let classifier = ImageClassifierBuilder::new()
        .model_path(&args.model_path)
        .labels_path(&args.labels_path)
        .input_shape((args.input_size, args.input_size))
        .batch_size(args.batch_size)
        .build()?;

    let predictions = classifier.classify_dir(&args.images_dir)?;

    info!("Obtained {} predictions", predictions.len());
    for prediction in &predictions {
        if let Some((label, probability)) = prediction.top1() {
            info!("Predicted : '{}' with probability {}", label, probability);
        }
    }

    Ok(())
}
