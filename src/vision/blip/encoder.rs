// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! BLIP vision encoder model
//!
//! This module provides the vision encoding half of the caption pipeline.
//! It turns a preprocessed image tensor into the hidden states the text
//! decoder attends over.

use anyhow::{Context, Result};
use ndarray::{Array2, Array4, IxDyn};
use ort::ep::CPU as CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::preprocessing::BLIP_INPUT_SIZE;

/// Expected input size for the BLIP encoder
pub const ENCODER_INPUT_SIZE: u32 = BLIP_INPUT_SIZE; // 384x384

/// Default hidden dimension for BLIP-base
const DEFAULT_HIDDEN_DIM: usize = 768;

/// BLIP vision encoder model
///
/// CPU-only so the service runs on machines without a GPU.
#[derive(Clone)]
pub struct BlipEncoder {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    /// Model output name (image hidden states)
    output_name: String,
    /// Hidden state dimension
    hidden_dim: usize,
    /// Whether model is loaded and ready
    is_ready: bool,
}

impl std::fmt::Debug for BlipEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlipEncoder")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("hidden_dim", &self.hidden_dim)
            .field("is_ready", &self.is_ready)
            .finish_non_exhaustive()
    }
}

impl BlipEncoder {
    /// Load the BLIP vision encoder from a file
    ///
    /// # Arguments
    /// - `model_path`: Path to the ONNX model file (vision_model.onnx)
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    pub async fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("BLIP encoder model not found: {}", model_path.display());
        }

        info!("Loading BLIP vision encoder from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .map_err(ort::Error::<()>::from)
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(ort::Error::<()>::from)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .map_err(ort::Error::<()>::from)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load BLIP encoder model from {}",
                model_path.display()
            ))?;

        // Get input/output names
        let input_name = session
            .inputs()
            .first()
            .map(|input| input.name().to_string())
            .unwrap_or_else(|| "pixel_values".to_string());

        let output_name = session
            .outputs()
            .first()
            .map(|output| output.name().to_string())
            .unwrap_or_else(|| "last_hidden_state".to_string());

        debug!(
            "BLIP encoder loaded - input: {}, output: {}",
            input_name, output_name
        );

        info!(
            "✅ BLIP encoder loaded successfully (CPU-only, {}D hidden states)",
            DEFAULT_HIDDEN_DIM
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            output_name,
            hidden_dim: DEFAULT_HIDDEN_DIM,
            is_ready: true,
        })
    }

    /// Get the hidden state dimension
    pub fn hidden_dim(&self) -> usize {
        self.hidden_dim
    }

    /// Check if the model is ready for inference
    pub fn is_ready(&self) -> bool {
        self.is_ready
    }

    /// Encode an image into visual hidden states
    ///
    /// # Arguments
    /// - `input`: Preprocessed image tensor of shape [1, 3, 384, 384] (NCHW)
    ///
    /// # Returns
    /// - `Result<Array2<f32>>`: Image hidden states of shape [seq_len, hidden_dim]
    ///
    /// # Notes
    /// The input tensor should come from `preprocess_for_blip()`
    pub fn encode(&self, input: &Array4<f32>) -> Result<Array2<f32>> {
        let shape = input.shape();
        if shape.len() != 4 || shape[0] != 1 || shape[1] != 3 {
            anyhow::bail!("Invalid input shape: {:?}, expected [1, 3, H, W]", shape);
        }

        if shape[2] != ENCODER_INPUT_SIZE as usize || shape[3] != ENCODER_INPUT_SIZE as usize {
            debug!(
                "Input size {}x{} differs from expected {}x{}",
                shape[2], shape[3], ENCODER_INPUT_SIZE, ENCODER_INPUT_SIZE
            );
        }

        let mut session = self.session.lock().unwrap();

        let input_value =
            Value::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Encoder inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        debug!("Encoder output shape: {:?}", output_tensor.shape());

        self.parse_encoder_output(&output_tensor)
    }

    /// Parse encoder output into 2D hidden states
    fn parse_encoder_output(
        &self,
        output: &ndarray::ArrayBase<ndarray::ViewRepr<&f32>, ndarray::Dim<ndarray::IxDynImpl>>,
    ) -> Result<Array2<f32>> {
        let shape = output.shape();

        // Expected shapes:
        // - [batch, seq_len, hidden_dim] -> extract [seq_len, hidden_dim]
        // - [seq_len, hidden_dim] -> use directly
        let (seq_len, hidden_dim) = match shape.len() {
            3 => (shape[1], shape[2]),
            2 => (shape[0], shape[1]),
            _ => {
                anyhow::bail!("Unexpected encoder output shape: {:?}", shape);
            }
        };

        let mut hidden = Array2::<f32>::zeros((seq_len, hidden_dim));

        for s in 0..seq_len {
            for h in 0..hidden_dim {
                hidden[[s, h]] = match shape.len() {
                    3 => output[IxDyn(&[0, s, h])],
                    2 => output[IxDyn(&[s, h])],
                    _ => 0.0,
                };
            }
        }

        debug!(
            "Parsed encoder output: {} positions x {} dimensions",
            seq_len, hidden_dim
        );

        Ok(hidden)
    }
}
