//! Image-to-feature-vector encoding.
//!
//! This module converts a decoded RGB image into the flattened,
//! channel-planar feature vector the pretrained network expects as input.
//! The layout is part of the network's input contract and must be
//! reproduced exactly: three contiguous planes (red, green, blue), each of
//! length `width * height`, with the spatial index running column-major
//! within a plane.

use crate::core::ClassifyError;
use image::RgbImage;

/// Encodes fixed-size RGB images into normalized, channel-planar feature vectors.
///
/// The encoder is configured once with the dimensions the network expects
/// and rejects any image that does not match them exactly; it never resizes
/// or crops. Encoding is a pure function of the input image.
#[derive(Debug, Clone)]
pub struct ImageFeatureEncoder {
    /// Expected image width in pixels.
    width: u32,
    /// Expected image height in pixels.
    height: u32,
}

impl ImageFeatureEncoder {
    /// Creates an encoder for images of the given dimensions.
    ///
    /// # Arguments
    ///
    /// * `width` - The width every input image must have.
    /// * `height` - The height every input image must have.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self, ClassifyError> {
        if width == 0 || height == 0 {
            return Err(ClassifyError::config_error(format!(
                "encoder dimensions must be greater than 0, got {width} x {height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Returns the length of the feature vectors this encoder produces.
    pub fn feature_count(&self) -> usize {
        (self.width * self.height * 3) as usize
    }

    /// Returns the (width, height) this encoder expects.
    pub fn input_shape(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Encodes one image into a feature vector of length `width * height * 3`.
    ///
    /// Channel values are normalized to `[0.0, 1.0]` by dividing by 255.
    /// The pixel at column `w`, row `h` occupies spatial index
    /// `ind = w * height + h`; its red value lands at `data[ind]`, green at
    /// `data[ind + width*height]`, blue at `data[ind + 2*width*height]`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` if the image's dimensions differ from
    /// the configured ones. No other failure is possible.
    pub fn encode(&self, image: &RgbImage) -> Result<Vec<f32>, ClassifyError> {
        if image.width() != self.width || image.height() != self.height {
            return Err(ClassifyError::invalid_dimensions(
                (self.width, self.height),
                (image.width(), image.height()),
            ));
        }

        let width = self.width as usize;
        let height = self.height as usize;
        let plane = width * height;
        let mut data = vec![0.0f32; plane * 3];

        // ind walks down each column before advancing to the next, so the
        // spatial order within a plane is column-major.
        let mut ind = 0;
        for w in 0..width {
            for h in 0..height {
                let pixel = image.get_pixel(w as u32, h as u32);

                data[ind] = pixel[0] as f32 / 255.0;
                data[ind + plane] = pixel[1] as f32 / 255.0;
                data[ind + 2 * plane] = pixel[2] as f32 / 255.0;
                ind += 1;
            }
        }

        Ok(data)
    }
}
