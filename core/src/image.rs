use image::{GrayImage, RgbImage};

use crate::tensor::Tensor3;

/// Converts a grayscale image into a (rows, cols, 1) tensor of raw `u8`
/// intensities.
pub fn tensor_from_gray(image: &GrayImage) -> Tensor3<u8> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    Tensor3::from_vec(image.as_raw().clone(), height, width, 1)
        .expect("GrayImage buffer matches its dimensions")
}

/// Converts an RGB image into a (rows, cols, 3) tensor of raw `u8`
/// intensities, channels interleaved per pixel.
pub fn tensor_from_rgb(image: &RgbImage) -> Tensor3<u8> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    Tensor3::from_vec(image.as_raw().clone(), height, width, 3)
        .expect("RgbImage buffer matches its dimensions")
}
