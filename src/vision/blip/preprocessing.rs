// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the BLIP caption model

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Target size for the BLIP vision encoder
pub const BLIP_INPUT_SIZE: u32 = 384;

/// CLIP normalization mean values (BLIP reuses the CLIP statistics)
pub const MEAN: [f32; 3] = [0.48145466, 0.4578275, 0.40821073];

/// CLIP normalization std values
pub const STD: [f32; 3] = [0.26862954, 0.26130258, 0.27577711];

/// Preprocess an image for the BLIP encoder
///
/// Steps:
/// 1. Resize to BLIP_INPUT_SIZE x BLIP_INPUT_SIZE (stretch; the model's
///    processor does not preserve aspect ratio)
/// 2. Convert to RGB
/// 3. Normalize with CLIP mean/std: (pixel/255 - mean) / std
/// 4. Convert to NCHW tensor format [1, 3, H, W]
pub fn preprocess_for_blip(image: &DynamicImage) -> Array4<f32> {
    let resized = resize_for_encoder(image, BLIP_INPUT_SIZE);
    let rgb = resized.to_rgb8();

    // Create output tensor in NCHW format
    let size = BLIP_INPUT_SIZE as usize;
    let mut tensor = Array4::zeros((1, 3, size, size));

    // Fill tensor with normalized pixel values
    for y in 0..size {
        for x in 0..size {
            let pixel = rgb.get_pixel(x as u32, y as u32);

            for c in 0..3 {
                let normalized = (pixel[c] as f32 / 255.0 - MEAN[c]) / STD[c];
                tensor[[0, c, y, x]] = normalized;
            }
        }
    }

    tensor
}

/// Stretch-resize an image to the square encoder input size
///
/// Uses a cubic filter, matching the bicubic resampling of the model's
/// reference processor.
pub fn resize_for_encoder(image: &DynamicImage, target_size: u32) -> DynamicImage {
    let (orig_w, orig_h) = image.dimensions();

    // Degenerate images become a flat gray square rather than panicking
    if orig_w == 0 || orig_h == 0 {
        return DynamicImage::ImageRgb8(RgbImage::from_pixel(
            target_size,
            target_size,
            Rgb([128, 128, 128]),
        ));
    }

    image.resize_exact(
        target_size,
        target_size,
        image::imageops::FilterType::CatmullRom,
    )
}
