// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Caption model artifact retrieval from the Hugging Face Hub

use anyhow::{Context, Result};
use hf_hub::{api::sync::Api, Repo, RepoType};
use std::path::PathBuf;
use tracing::info;

/// Default hub repository carrying the BLIP ONNX export
pub const DEFAULT_MODEL_REPO: &str = "Xenova/blip-image-captioning-base";

/// Resolved locations of the three model artifacts
#[derive(Debug, Clone)]
pub struct ModelPaths {
    /// Vision encoder ONNX file
    pub vision_model: PathBuf,
    /// Text decoder ONNX file
    pub text_decoder: PathBuf,
    /// Tokenizer definition
    pub tokenizer: PathBuf,
}

/// Fetch the BLIP artifacts from the Hugging Face Hub
///
/// The hub client keeps a local cache, so the network is only hit for
/// files that have not been downloaded before. Returns the cached paths.
///
/// # Arguments
/// * `repo_id` - Hub repository id, e.g. `Xenova/blip-image-captioning-base`
///
/// # Errors
/// Returns an error if the hub API cannot be initialized or any of the
/// three artifacts cannot be retrieved. Callers treat this as fatal.
pub fn fetch_model_files(repo_id: &str) -> Result<ModelPaths> {
    info!("Resolving caption model artifacts from hub repo {}", repo_id);

    let api = Api::new().context("Failed to initialize Hugging Face Hub API")?;
    let repo = api.repo(Repo::new(repo_id.to_string(), RepoType::Model));

    let vision_model = repo
        .get("onnx/vision_model.onnx")
        .with_context(|| format!("Failed to fetch vision encoder from {}", repo_id))?;

    let text_decoder = repo
        .get("onnx/text_decoder_model_merged.onnx")
        .with_context(|| format!("Failed to fetch text decoder from {}", repo_id))?;

    let tokenizer = repo
        .get("tokenizer.json")
        .with_context(|| format!("Failed to fetch tokenizer from {}", repo_id))?;

    info!(
        "Caption model artifacts ready: {}",
        vision_model
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    );

    Ok(ModelPaths {
        vision_model,
        text_decoder,
        tokenizer,
    })
}
