//! Image preprocessing for inference.
//!
//! Decodes image bytes (PNG/JPEG/BMP/GIF), resizes them to the network's
//! 28×28 input, converts to grayscale and normalizes pixels to [0, 1].

use std::path::Path;

use crate::config::{IMAGE_SIZE, INPUT_CHANNELS};
use crate::error::{Error, Result};
use crate::math::tensor::Tensor;

/// Decodes image bytes into a (1, 1, 28, 28) tensor.
pub fn grayscale_tensor_from_bytes(bytes: &[u8]) -> Result<Tensor> {
    let img = image::load_from_memory(bytes)?;
    let side = IMAGE_SIZE as u32;
    let resized = img.resize_exact(side, side, image::imageops::FilterType::Lanczos3);
    let gray = resized.to_luma8();
    let pixels = gray.pixels().map(|p| p.0[0] as f64 / 255.0).collect();
    Tensor::from_vec([1, INPUT_CHANNELS, IMAGE_SIZE, IMAGE_SIZE], pixels)
}

/// Reads and decodes an image file into a (1, 1, 28, 28) tensor.
pub fn grayscale_tensor_from_path(path: impl AsRef<Path>) -> Result<Tensor> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    grayscale_tensor_from_bytes(&bytes)
}

/// Decodes several images and stacks them into one (N, 1, 28, 28) batch.
pub fn batch_from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Tensor> {
    let samples = paths
        .iter()
        .map(grayscale_tensor_from_path)
        .collect::<Result<Vec<_>>>()?;
    Tensor::stack(&samples)
}
