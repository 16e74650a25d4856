// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based image captioning
//!
//! This module provides:
//! - Image decoding and validation (JPEG and PNG)
//! - One-sentence caption generation via BLIP
//!
//! Inference runs on CPU only, so the service works on any host.

pub mod blip;
pub mod captioner;
pub mod fetch;
pub mod image_utils;
pub mod loader;

pub use blip::{BlipModel, CaptionResult};
pub use captioner::{CaptionError, FailingCaptioner, FixedCaptioner, ImageCaptioner};
pub use fetch::{fetch_model_files, ModelPaths, DEFAULT_MODEL_REPO};
pub use image_utils::{decode_image_bytes, detect_format, ImageError, ImageInfo};
pub use loader::{load_captioner, CaptionModelConfig};
