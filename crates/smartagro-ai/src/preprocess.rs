//! Leaf image preprocessing for the disease classifier.
//!
//! Any decodable image is converted to RGB, stretched to 128×128 (aspect
//! ratio is not preserved) and scaled to `[0, 1]`. The result is laid out
//! NHWC with a batch dimension of one, matching the classifier's input.

use image::imageops::{self, FilterType};
use tracing::debug;

use crate::AiError;

/// Classifier input edge length in pixels.
pub const INPUT_SIZE: u32 = 128;

/// Colour channels per pixel.
pub const CHANNELS: usize = 3;

/// Upload extensions accepted at the request boundary.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Normalised `(1, 128, 128, 3)` image tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: Vec<f32>,
}

impl ImageTensor {
    pub const SHAPE: [usize; 4] = [1, INPUT_SIZE as usize, INPUT_SIZE as usize, CHANNELS];

    /// Number of values in the tensor.
    pub const LEN: usize = Self::SHAPE[0] * Self::SHAPE[1] * Self::SHAPE[2] * Self::SHAPE[3];

    /// Wrap raw NHWC values. Returns `None` unless exactly [`Self::LEN`] values
    /// are given.
    pub fn from_vec(data: Vec<f32>) -> Option<Self> {
        (data.len() == Self::LEN).then_some(Self { data })
    }

    pub fn shape(&self) -> [usize; 4] {
        Self::SHAPE
    }

    /// Flat values in NHWC order.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Value at batch 0, row `y`, column `x`, channel `c`.
    #[cfg(test)]
    fn pixel(&self, y: usize, x: usize, c: usize) -> f32 {
        self.data[(y * Self::SHAPE[2] + x) * CHANNELS + c]
    }
}

/// Decode and normalise an uploaded image.
pub fn preprocess(bytes: &[u8]) -> Result<ImageTensor, AiError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| AiError::UnsupportedImage(e.to_string()))?;
    debug!(
        width = decoded.width(),
        height = decoded.height(),
        color = ?decoded.color(),
        "decoded upload"
    );

    let rgb = decoded.to_rgb8();
    let resized = imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom);

    let data = resized
        .as_raw()
        .iter()
        .map(|&v| f32::from(v) / 255.0)
        .collect();
    Ok(ImageTensor { data })
}

/// Whether an upload's file name carries an accepted image extension.
pub fn is_allowed_upload(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}
