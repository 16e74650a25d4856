// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! BLIP integration for image captioning
//!
//! This module provides CPU-based image captioning using the BLIP ONNX
//! model pair.
//!
//! Components:
//! - `encoder` - Vision encoder for image feature extraction
//! - `decoder` - Language decoder for caption generation
//! - `model` - Combined caption pipeline
//! - `preprocessing` - Image preprocessing for encoder input

pub mod decoder;
pub mod encoder;
pub mod model;
pub mod preprocessing;

pub use decoder::BlipDecoder;
pub use encoder::BlipEncoder;
pub use model::{BlipModel, CaptionResult};
pub use preprocessing::{preprocess_for_blip, BLIP_INPUT_SIZE};
