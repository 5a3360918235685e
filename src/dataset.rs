//! Directory-backed image datasets.
//!
//! This module scans a directory laid out one-subdirectory-per-class for
//! raster image files, pairs each file with the class name taken from its
//! parent directory, and decodes the files into RGB images. Decoding uses
//! parallel loading when the number of images exceeds a threshold.

use crate::core::ClassifyError;
use image::RgbImage;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Number of images above which decoding switches to parallel loading.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4;

/// File extensions accepted by default, compared case-insensitively.
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// One dataset entry: an image path plus the class name of its parent directory.
#[derive(Debug, Clone)]
pub struct DatasetEntry {
    /// Path to the image file.
    pub path: PathBuf,
    /// Class name derived from the parent directory, when one exists.
    pub class_name: Option<String>,
}

/// A finite, in-memory listing of image files under a directory.
///
/// Scanning a missing directory or one with no matching files produces an
/// empty dataset rather than an error; the pipeline then degrades to zero
/// examples processed.
#[derive(Debug, Default)]
pub struct ImageDirectoryDataset {
    entries: Vec<DatasetEntry>,
}

impl ImageDirectoryDataset {
    /// Scans `dir` recursively for files with the default extensions.
    pub fn scan(dir: &Path) -> Self {
        Self::scan_with_extensions(dir, DEFAULT_EXTENSIONS)
    }

    /// Scans `dir` recursively, keeping files whose extension matches one
    /// of `extensions` (case-insensitive).
    ///
    /// Entries are sorted by path so repeated runs process images in the
    /// same order.
    pub fn scan_with_extensions(dir: &Path, extensions: &[&str]) -> Self {
        let mut entries: Vec<DatasetEntry> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| {
                        extensions
                            .iter()
                            .any(|candidate| ext.eq_ignore_ascii_case(candidate))
                    })
                    .unwrap_or(false)
            })
            .map(|entry| {
                let path = entry.into_path();
                let class_name = path
                    .parent()
                    .and_then(|parent| parent.file_name())
                    .and_then(|name| name.to_str())
                    .map(|name| name.to_string());
                DatasetEntry { path, class_name }
            })
            .collect();

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Self { entries }
    }

    /// Returns the dataset entries in scan order.
    pub fn entries(&self) -> &[DatasetEntry] {
        &self.entries
    }

    /// Returns the image paths in scan order.
    pub fn paths(&self) -> Vec<&Path> {
        self.entries.iter().map(|e| e.path.as_path()).collect()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Loads an image from a file path and converts it to RgbImage.
///
/// The file handle is scoped to the decode call and released on return,
/// whether or not decoding succeeds.
///
/// # Errors
///
/// Returns a `ClassifyError::ImageLoad` error if the image cannot be
/// decoded.
pub fn load_image(path: &Path) -> Result<RgbImage, ClassifyError> {
    let img = image::open(path).map_err(ClassifyError::ImageLoad)?;
    Ok(img.to_rgb8())
}

/// Loads a batch of images from file paths.
///
/// Uses parallel loading when the number of images exceeds the default
/// threshold. Any decode failure fails the whole batch.
pub fn load_images_batch<P: AsRef<Path> + Send + Sync>(
    paths: &[P],
) -> Result<Vec<RgbImage>, ClassifyError> {
    load_images_batch_with_threshold(paths, None)
}

/// Loads a batch of images from file paths with a custom parallel threshold.
///
/// # Arguments
///
/// * `paths` - The paths of the image files to load.
/// * `parallel_threshold` - Optional threshold above which loading runs in
///   parallel. If `None`, `DEFAULT_PARALLEL_THRESHOLD` is used.
pub fn load_images_batch_with_threshold<P: AsRef<Path> + Send + Sync>(
    paths: &[P],
    parallel_threshold: Option<usize>,
) -> Result<Vec<RgbImage>, ClassifyError> {
    let threshold = parallel_threshold.unwrap_or(DEFAULT_PARALLEL_THRESHOLD);

    if paths.len() > threshold {
        use rayon::prelude::*;
        paths.par_iter().map(|p| load_image(p.as_ref())).collect()
    } else {
        paths.iter().map(|p| load_image(p.as_ref())).collect()
    }
}
