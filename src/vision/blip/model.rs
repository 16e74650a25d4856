// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! BLIP model wrapper for image captioning
//!
//! This module provides the complete caption pipeline combining:
//! - Vision encoder (image feature extraction)
//! - Language decoder (caption generation)

use anyhow::{Context, Result};
use image::{DynamicImage, GenericImageView};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use super::decoder::BlipDecoder;
use super::encoder::BlipEncoder;
use super::preprocessing::preprocess_for_blip;

/// Result of caption generation
#[derive(Debug, Clone)]
pub struct CaptionResult {
    /// Generated caption text
    pub caption: String,
    /// Source image width
    pub width: u32,
    /// Source image height
    pub height: u32,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// BLIP model for image captioning
///
/// Combines the vision encoder and language decoder, CPU-only.
#[derive(Clone)]
pub struct BlipModel {
    /// Vision encoder
    encoder: BlipEncoder,
    /// Language decoder
    decoder: BlipDecoder,
    /// Model directory path
    model_dir: String,
    /// Whether the model is ready for inference
    is_ready: bool,
}

impl std::fmt::Debug for BlipModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlipModel")
            .field("model_dir", &self.model_dir)
            .field("is_ready", &self.is_ready)
            .finish_non_exhaustive()
    }
}

impl BlipModel {
    /// Load the BLIP model pair from the specified directory
    ///
    /// Expected files:
    /// - vision_model.onnx (vision encoder)
    /// - text_decoder.onnx or text_decoder_model_merged.onnx (decoder)
    /// - tokenizer.json (tokenizer config)
    ///
    /// # Arguments
    /// - `model_dir`: Directory containing the model files
    ///
    /// # Errors
    /// Returns error if:
    /// - Model directory doesn't exist
    /// - Required model files are missing
    /// - ONNX Runtime initialization fails
    pub async fn new<P: AsRef<Path>>(model_dir: P) -> Result<Self> {
        let model_dir = model_dir.as_ref();

        if !model_dir.exists() {
            anyhow::bail!("BLIP model directory not found: {}", model_dir.display());
        }

        info!("Loading BLIP models from {}", model_dir.display());

        let encoder_path = Self::find_model_file(
            model_dir,
            &["vision_model.onnx", "vision_encoder.onnx", "encoder_model.onnx"],
        )?;

        let decoder_path = Self::find_model_file(
            model_dir,
            &[
                "text_decoder.onnx",
                "text_decoder_model.onnx",
                "text_decoder_model_merged.onnx",
                "decoder_model.onnx",
            ],
        )?;

        let tokenizer_path = model_dir.join("tokenizer.json");

        Self::from_paths(&encoder_path, &decoder_path, &tokenizer_path).await
    }

    /// Load the BLIP model pair from explicit file paths
    ///
    /// Used when the artifacts do not share one directory, e.g. when they
    /// come out of the Hugging Face Hub cache.
    pub async fn from_paths(
        encoder_path: &Path,
        decoder_path: &Path,
        tokenizer_path: &Path,
    ) -> Result<Self> {
        let encoder = BlipEncoder::new(encoder_path)
            .await
            .context("Failed to load BLIP encoder")?;

        let decoder = BlipDecoder::new(decoder_path, tokenizer_path)
            .await
            .context("Failed to load BLIP decoder")?;

        info!("✅ BLIP caption pipeline ready (CPU-only)");

        Ok(Self {
            encoder,
            decoder,
            model_dir: encoder_path
                .parent()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_default(),
            is_ready: true,
        })
    }

    /// Find a model file by trying multiple possible names
    fn find_model_file(dir: &Path, names: &[&str]) -> Result<std::path::PathBuf> {
        for name in names {
            let path = dir.join(name);
            if path.exists() {
                return Ok(path);
            }
        }
        anyhow::bail!(
            "Model file not found in {}. Tried: {:?}",
            dir.display(),
            names
        );
    }

    /// Check if the model is ready for inference
    pub fn is_ready(&self) -> bool {
        self.is_ready
    }

    /// Cap the caption length in decoder tokens
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.decoder = self.decoder.with_max_tokens(max_tokens);
        self
    }

    /// Generate a one-sentence caption for an image
    ///
    /// # Arguments
    /// * `image` - The decoded RGB image to caption
    ///
    /// # Returns
    /// - `Result<CaptionResult>`: Caption text with timing metadata
    ///
    /// # Process
    /// 1. Preprocess image for the encoder (resize, normalize)
    /// 2. Extract visual hidden states with the encoder
    /// 3. Generate caption tokens with the decoder
    /// 4. Return caption with timing
    pub fn caption(&self, image: &DynamicImage) -> Result<CaptionResult> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        debug!("Preprocessing image {}x{}", width, height);
        let preprocessed = preprocess_for_blip(image);

        let hidden = self
            .encoder
            .encode(&preprocessed)
            .context("Failed to encode image")?;
        debug!(
            "Encoded to {} positions x {} dimensions",
            hidden.nrows(),
            hidden.ncols()
        );

        let caption = self
            .decoder
            .generate(&hidden)
            .context("Failed to generate caption")?;

        // A decodable image must yield text; an empty caption means the
        // decoder immediately emitted EOS, which callers cannot use.
        if caption.is_empty() {
            anyhow::bail!("Caption generation produced an empty caption");
        }

        let processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "Caption complete: {} chars, {}ms",
            caption.len(),
            processing_time_ms
        );

        Ok(CaptionResult {
            caption,
            width,
            height,
            processing_time_ms,
        })
    }
}
