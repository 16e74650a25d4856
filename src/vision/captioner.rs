// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Captioner abstraction over the loaded model pair
//!
//! Handlers depend on this trait rather than the concrete BLIP pipeline,
//! so tests can substitute a fixed captioner without ONNX weights.

use image::{DynamicImage, GenericImageView};
use thiserror::Error;

use crate::vision::blip::{BlipModel, CaptionResult};

/// Errors surfaced by caption generation
#[derive(Debug, Error)]
pub enum CaptionError {
    #[error("Caption model inference failed: {0}")]
    Inference(String),

    #[error("Caption model is not ready")]
    NotReady,
}

/// A model that turns a decoded RGB image into a one-sentence caption
pub trait ImageCaptioner: Send + Sync {
    /// Generate a caption for the image
    fn caption_image(&self, image: &DynamicImage) -> Result<CaptionResult, CaptionError>;

    /// Human-readable model identity for health reporting
    fn model_name(&self) -> &str;
}

impl ImageCaptioner for BlipModel {
    fn caption_image(&self, image: &DynamicImage) -> Result<CaptionResult, CaptionError> {
        if !self.is_ready() {
            return Err(CaptionError::NotReady);
        }
        self.caption(image)
            .map_err(|e| CaptionError::Inference(e.to_string()))
    }

    fn model_name(&self) -> &str {
        "blip-image-captioning-base"
    }
}

/// Captioner that answers every image with a canned caption
///
/// Stands in for the real model in tests and offline development, where
/// downloading ONNX weights is not an option.
pub struct FixedCaptioner {
    caption: String,
    model: String,
}

impl FixedCaptioner {
    pub fn new(caption: &str) -> Self {
        Self {
            caption: caption.to_string(),
            model: "fixed-captioner".to_string(),
        }
    }
}

impl ImageCaptioner for FixedCaptioner {
    fn caption_image(&self, image: &DynamicImage) -> Result<CaptionResult, CaptionError> {
        let (width, height) = image.dimensions();
        Ok(CaptionResult {
            caption: self.caption.clone(),
            width,
            height,
            processing_time_ms: 0,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Captioner that fails every request, for error path testing
pub struct FailingCaptioner;

impl ImageCaptioner for FailingCaptioner {
    fn caption_image(&self, _image: &DynamicImage) -> Result<CaptionResult, CaptionError> {
        Err(CaptionError::Inference(
            "caption model unavailable".to_string(),
        ))
    }

    fn model_name(&self) -> &str {
        "failing-captioner"
    }
}
