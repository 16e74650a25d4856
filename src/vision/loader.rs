// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Caption model resolution and startup loading
//!
//! Resolves model artifacts from a local directory when one is configured
//! and present, falling back to the Hugging Face Hub cache otherwise. The
//! model is loaded exactly once at startup and shared behind an `Arc`.

use crate::vision::blip::decoder::DEFAULT_MAX_TOKENS;
use crate::vision::blip::BlipModel;
use crate::vision::fetch::{fetch_model_files, DEFAULT_MODEL_REPO};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Where and how to load the caption model
#[derive(Debug, Clone)]
pub struct CaptionModelConfig {
    /// Local directory holding the ONNX files and tokenizer, if any
    pub model_dir: Option<String>,
    /// Hub repository to fetch from when no usable local directory exists
    pub model_repo: String,
    /// Cap on generated caption length in tokens
    pub max_tokens: usize,
}

impl Default for CaptionModelConfig {
    fn default() -> Self {
        Self {
            model_dir: None,
            model_repo: DEFAULT_MODEL_REPO.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Load the caption model according to `config`
///
/// A configured directory that exists is used as-is; errors from a broken
/// local directory are surfaced rather than papered over with a hub fetch.
/// Without a usable directory the artifacts come from the hub cache,
/// downloading on first run.
///
/// Failure here is fatal. The process must not serve requests without a
/// working caption model.
pub async fn load_captioner(config: &CaptionModelConfig) -> Result<Arc<BlipModel>> {
    let model = match &config.model_dir {
        Some(dir) if Path::new(dir).exists() => {
            info!("Loading caption model from local directory: {}", dir);
            BlipModel::new(dir)
                .await
                .with_context(|| format!("Failed to load caption model from {}", dir))?
        }
        Some(dir) => {
            warn!(
                "Configured model directory {} does not exist, fetching from hub",
                dir
            );
            load_from_hub(&config.model_repo).await?
        }
        None => load_from_hub(&config.model_repo).await?,
    };

    let model = model.with_max_tokens(config.max_tokens);
    info!("Caption model ready");
    Ok(Arc::new(model))
}

async fn load_from_hub(repo_id: &str) -> Result<BlipModel> {
    let paths = fetch_model_files(repo_id)?;
    BlipModel::from_paths(&paths.vision_model, &paths.text_decoder, &paths.tokenizer)
        .await
        .with_context(|| format!("Failed to load caption model fetched from {}", repo_id))
}
