// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Runtime configuration from CLI flags and environment variables

use clap::Parser;

use crate::speech::DEFAULT_TTS_ENDPOINT;
use crate::vision::loader::CaptionModelConfig;
use crate::vision::DEFAULT_MODEL_REPO;

/// Turn any image into a one-sentence story
#[derive(Debug, Clone, Parser)]
#[command(name = "storylens", version, about)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "STORYLENS_LISTEN_ADDR", default_value = "127.0.0.1:8080")]
    pub listen_addr: String,

    /// Local directory holding the caption model ONNX files and tokenizer
    #[arg(long, env = "STORYLENS_MODEL_DIR")]
    pub model_dir: Option<String>,

    /// Hugging Face Hub repository to fetch the model from
    #[arg(long, env = "STORYLENS_MODEL_REPO", default_value = DEFAULT_MODEL_REPO)]
    pub model_repo: String,

    /// Cap on generated caption length in tokens
    #[arg(long, env = "STORYLENS_MAX_TOKENS", default_value_t = 32)]
    pub max_tokens: usize,

    /// Text-to-speech endpoint for narration
    #[arg(long, env = "STORYLENS_TTS_ENDPOINT", default_value = DEFAULT_TTS_ENDPOINT)]
    pub tts_endpoint: String,

    /// Narration language code
    #[arg(long, env = "STORYLENS_TTS_LANG", default_value = "en")]
    pub tts_lang: String,

    /// Maximum upload body size in bytes
    #[arg(long, env = "STORYLENS_MAX_UPLOAD_BYTES", default_value_t = 25 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    /// Maximum number of concurrently tracked sessions
    #[arg(long, env = "STORYLENS_MAX_SESSIONS", default_value_t = 256)]
    pub max_sessions: usize,

    /// Seconds of inactivity before a session is evicted
    #[arg(long, env = "STORYLENS_SESSION_IDLE_SECS", default_value_t = 1800)]
    pub session_idle_secs: u64,
}

impl Config {
    /// The model loading slice of the configuration
    pub fn caption_model_config(&self) -> CaptionModelConfig {
        CaptionModelConfig {
            model_dir: self.model_dir.clone(),
            model_repo: self.model_repo.clone(),
            max_tokens: self.max_tokens,
        }
    }
}
