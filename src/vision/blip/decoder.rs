// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! BLIP language decoder model
//!
//! This module provides the text generation half of the caption pipeline.
//! It runs the BLIP text decoder autoregressively over the encoder's
//! image hidden states and detokenizes the result.

use anyhow::{Context, Result};
use ndarray::{Array1, Array2, Array3, Array4, IxDyn};
use ort::ep::CPU as CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::{Session, SessionInputValue, SessionInputs};
use ort::value::Value;
use std::borrow::Cow;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::Tokenizer;
use tracing::{debug, info};

/// Default maximum tokens for a one-sentence caption
pub const DEFAULT_MAX_TOKENS: usize = 32;

/// Minimum tokens to generate
pub const MIN_TOKENS: usize = 4;

/// Maximum tokens to generate
pub const MAX_TOKENS: usize = 128;

/// BLIP's text decoder is BERT-shaped: these drive the zero-length
/// past tensors that merged ONNX exports require even when unused.
const DECODER_KV_HEADS: usize = 12;
const DECODER_KV_HEAD_DIM: usize = 64;

/// BLIP language decoder model
///
/// Generates caption text from image hidden states, CPU-only.
/// Decoding is greedy, so output is deterministic for fixed weights
/// and a fixed input image.
#[derive(Clone)]
pub struct BlipDecoder {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Tokenizer for text decoding
    tokenizer: Arc<Tokenizer>,
    /// Maximum tokens to generate
    max_tokens: usize,
    /// Vocabulary size
    vocab_size: usize,
    /// Special token IDs
    bos_token_id: u32,
    eos_token_id: u32,
    /// Output name carrying the logits
    logits_name: String,
    /// Optional inputs discovered on the session
    has_attention_mask: bool,
    has_encoder_attention_mask: bool,
    has_use_cache_branch: bool,
    /// `past_key_values.*` input names (merged exports only)
    past_input_names: Vec<String>,
    /// Whether model is loaded and ready
    is_ready: bool,
}

impl std::fmt::Debug for BlipDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlipDecoder")
            .field("max_tokens", &self.max_tokens)
            .field("vocab_size", &self.vocab_size)
            .field("is_ready", &self.is_ready)
            .finish_non_exhaustive()
    }
}

impl BlipDecoder {
    /// Load the BLIP decoder from files
    ///
    /// # Arguments
    /// - `model_path`: Path to the ONNX model file (text_decoder.onnx or
    ///   text_decoder_model_merged.onnx)
    /// - `tokenizer_path`: Path to the tokenizer file (tokenizer.json)
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - Tokenizer file not found
    /// - ONNX Runtime initialization fails
    pub async fn new<P: AsRef<Path>>(model_path: P, tokenizer_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        let tokenizer_path = tokenizer_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("BLIP decoder model not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("BLIP tokenizer not found: {}", tokenizer_path.display());
        }

        info!("Loading BLIP decoder from {}", model_path.display());

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        let vocab_size = tokenizer.get_vocab_size(true);
        info!("Loaded tokenizer with {} tokens", vocab_size);

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
                "Failed to load BLIP decoder model from {}",
                model_path.display()
            ))?;

        // Inspect the graph: merged exports carry past_key_values inputs
        // and a use_cache_branch selector, plain exports do not.
        let input_names: Vec<String> = session.inputs().iter().map(|i| i.name().to_string()).collect();
        debug!("Decoder inputs: {:?}", input_names);

        let has_attention_mask = input_names.iter().any(|n| n == "attention_mask");
        let has_encoder_attention_mask =
            input_names.iter().any(|n| n == "encoder_attention_mask");
        let has_use_cache_branch = input_names.iter().any(|n| n == "use_cache_branch");
        let past_input_names: Vec<String> = input_names
            .iter()
            .filter(|n| n.starts_with("past_key_values."))
            .cloned()
            .collect();

        let logits_name = session
            .outputs()
            .iter()
            .find(|o| o.name() == "logits")
            .or_else(|| session.outputs().first())
            .map(|o| o.name().to_string())
            .unwrap_or_else(|| "logits".to_string());

        // BLIP's decoder start token is [DEC]; EOS is the BERT [SEP]
        let bos_token_id = tokenizer
            .token_to_id("[DEC]")
            .or_else(|| tokenizer.token_to_id("[CLS]"))
            .unwrap_or(30522);
        let eos_token_id = tokenizer
            .token_to_id("[SEP]")
            .or_else(|| tokenizer.token_to_id("</s>"))
            .unwrap_or(102);

        debug!(
            "Special tokens - BOS: {}, EOS: {}",
            bos_token_id, eos_token_id
        );

        info!(
            "✅ BLIP decoder loaded successfully (CPU-only, {} past inputs)",
            past_input_names.len()
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            max_tokens: DEFAULT_MAX_TOKENS,
            vocab_size,
            bos_token_id,
            eos_token_id,
            logits_name,
            has_attention_mask,
            has_encoder_attention_mask,
            has_use_cache_branch,
            past_input_names,
            is_ready: true,
        })
    }

    /// Set the maximum tokens to generate
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens.clamp(MIN_TOKENS, MAX_TOKENS);
        self
    }

    /// Get the current maximum tokens setting
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Get the vocabulary size
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Check if the model is ready for inference
    pub fn is_ready(&self) -> bool {
        self.is_ready
    }

    /// Generate caption text from image hidden states
    ///
    /// # Arguments
    /// - `image_hidden`: Visual features from the encoder [seq_len, hidden_dim]
    ///
    /// # Returns
    /// - `Result<String>`: Generated caption text
    ///
    /// # Process
    /// 1. Start from the decoder BOS token (unconditional captioning)
    /// 2. Run the greedy autoregressive loop, feeding the full prefix
    /// 3. Stop at EOS or the token ceiling
    /// 4. Decode tokens to text, stripping special tokens
    pub fn generate(&self, image_hidden: &Array2<f32>) -> Result<String> {
        let mut tokens = vec![self.bos_token_id];

        debug!(
            "Starting generation, EOS={}, max_tokens={}",
            self.eos_token_id, self.max_tokens
        );

        for step in 0..self.max_tokens {
            let logits = self.forward(image_hidden, &tokens)?;

            // Greedy decoding: highest-probability token
            let next_token = Self::argmax(&logits)?;

            if next_token == self.eos_token_id {
                debug!("Generation stopped at EOS after {} steps", step + 1);
                break;
            }

            tokens.push(next_token);
        }

        debug!("Generation complete: {} total tokens", tokens.len());

        // Drop the BOS before detokenizing
        let output_ids: Vec<u32> = tokens[1..].to_vec();

        let output_text = self
            .tokenizer
            .decode(&output_ids, true)
            .map_err(|e| anyhow::anyhow!("Decoding failed: {}", e))?;

        // Strip any special-token markup the decode left behind
        let cleaned = output_text
            .trim()
            .replace("[DEC]", "")
            .replace("[SEP]", "")
            .replace("[PAD]", "")
            .replace("[CLS]", "")
            .trim()
            .to_string();

        debug!("Generated caption: '{}'", cleaned);

        Ok(cleaned)
    }

    /// Run a single forward pass through the decoder
    ///
    /// The full token prefix is fed each step; merged exports get
    /// zero-length past tensors with the cache branch disabled.
    fn forward(&self, encoder_hidden_states: &Array2<f32>, input_ids: &[u32]) -> Result<Vec<f32>> {
        let token_len = input_ids.len();
        let mut ids = Array2::<i64>::zeros((1, token_len));
        for (i, &token) in input_ids.iter().enumerate() {
            ids[[0, i]] = token as i64;
        }

        // Encoder hidden states as [1, seq_len, hidden_dim]
        let (seq_len, hidden_dim) = (encoder_hidden_states.nrows(), encoder_hidden_states.ncols());
        let mut encoder_input = Array3::<f32>::zeros((1, seq_len, hidden_dim));
        for s in 0..seq_len {
            for h in 0..hidden_dim {
                encoder_input[[0, s, h]] = encoder_hidden_states[[s, h]];
            }
        }

        let mut feed: Vec<(Cow<'static, str>, SessionInputValue<'static>)> = Vec::new();

        let ids_value = Value::from_array(ids).context("Failed to create input_ids tensor")?;
        feed.push((Cow::Borrowed("input_ids"), ids_value.into()));

        if self.has_attention_mask {
            let mask = Array2::<i64>::ones((1, token_len));
            let mask_value =
                Value::from_array(mask).context("Failed to create attention mask tensor")?;
            feed.push((Cow::Borrowed("attention_mask"), mask_value.into()));
        }

        let encoder_value = Value::from_array(encoder_input)
            .context("Failed to create encoder hidden states tensor")?;
        feed.push((Cow::Borrowed("encoder_hidden_states"), encoder_value.into()));

        if self.has_encoder_attention_mask {
            let mask = Array2::<i64>::ones((1, seq_len));
            let mask_value = Value::from_array(mask)
                .context("Failed to create encoder attention mask tensor")?;
            feed.push((Cow::Borrowed("encoder_attention_mask"), mask_value.into()));
        }

        for name in &self.past_input_names {
            let past = Array4::<f32>::zeros((1, DECODER_KV_HEADS, 0, DECODER_KV_HEAD_DIM));
            let past_value = Value::from_array(past)
                .context(format!("Failed to create past tensor for {}", name))?;
            feed.push((Cow::Owned(name.clone()), past_value.into()));
        }

        if self.has_use_cache_branch {
            let flag = Array1::<bool>::from_elem(1, false);
            let flag_value =
                Value::from_array(flag).context("Failed to create use_cache_branch tensor")?;
            feed.push((Cow::Borrowed("use_cache_branch"), flag_value.into()));
        }

        let mut session = self.session.lock().unwrap();

        let outputs = session
            .run(SessionInputs::from(feed))
            .context("Decoder inference failed")?;

        let output_tensor = outputs[self.logits_name.as_str()]
            .try_extract_array::<f32>()
            .context("Failed to extract logits tensor")?;

        let output_shape = output_tensor.shape();

        // Logits for the last position [vocab_size]
        let last_pos = if output_shape.len() >= 2 {
            output_shape[1] - 1
        } else {
            0
        };

        let vocab_size = if output_shape.len() == 3 {
            output_shape[2]
        } else if output_shape.len() == 2 {
            output_shape[1]
        } else {
            self.vocab_size
        };

        let mut logits = vec![0.0f32; vocab_size];

        for v in 0..vocab_size {
            logits[v] = match output_shape.len() {
                3 => output_tensor[IxDyn(&[0, last_pos, v])],
                2 => output_tensor[IxDyn(&[last_pos, v])],
                _ => 0.0,
            };
        }

        Ok(logits)
    }

    /// Find the index of the maximum value (greedy decoding)
    fn argmax(logits: &[f32]) -> Result<u32> {
        let (max_idx, _) = logits
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or_else(|| anyhow::anyhow!("Empty logits vector"))?;

        Ok(max_idx as u32)
    }
}
