// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text-to-speech client for caption narration
//!
//! Talks to a Google Translate style TTS endpoint that renders short text
//! fragments as MP3. The endpoint caps each utterance at 100 characters,
//! so longer captions are split at whitespace and the MP3 frames of the
//! parts are concatenated. MP3 streams survive naive concatenation, which
//! is the same trick the popular gTTS client uses.

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Public endpoint used when no override is configured
pub const DEFAULT_TTS_ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// Upstream limit on characters per synthesized fragment
pub const MAX_CHUNK_CHARS: usize = 100;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors from speech synthesis
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Cannot narrate an empty caption")]
    EmptyText,
    #[error("Speech endpoint returned status {status}")]
    UpstreamStatus { status: u16 },
    #[error("Speech request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Client for synthesizing caption audio
///
/// Holds no audio state. Every call performs fresh synthesis, so edits to
/// a caption are always narrated from the current text.
pub struct SpeechSynthesizer {
    client: Client,
    endpoint: String,
    lang: String,
}

impl SpeechSynthesizer {
    /// Create a new synthesizer against `endpoint`, narrating in `lang`
    pub fn new(endpoint: &str, lang: &str) -> Result<Self, SpeechError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let endpoint = endpoint.trim_end_matches('/').to_string();
        info!(
            "Speech synthesizer configured: endpoint={}, lang={}",
            endpoint, lang
        );

        Ok(Self {
            client,
            endpoint,
            lang: lang.to_string(),
        })
    }

    /// Get the configured narration language
    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Synthesize `text` in the configured language
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        self.synthesize_in(text, &self.lang).await
    }

    /// Synthesize `text` in an explicit language
    ///
    /// Returns the complete MP3 byte stream. Fails if the text is blank,
    /// the endpoint is unreachable, or any fragment request comes back
    /// with a non-success status.
    pub async fn synthesize_in(&self, text: &str, lang: &str) -> Result<Vec<u8>, SpeechError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SpeechError::EmptyText);
        }

        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        let total = chunks.len();
        let mut audio = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            debug!(
                "Synthesizing fragment {}/{} ({} chars)",
                idx + 1,
                total,
                chunk.chars().count()
            );

            let params = [
                ("ie", "UTF-8".to_string()),
                ("q", chunk.clone()),
                ("tl", lang.to_string()),
                ("client", "tw-ob".to_string()),
                ("idx", idx.to_string()),
                ("total", total.to_string()),
            ];

            let response = self
                .client
                .get(&self.endpoint)
                .query(&params)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(SpeechError::UpstreamStatus {
                    status: status.as_u16(),
                });
            }

            let bytes = response.bytes().await?;
            audio.extend_from_slice(&bytes);
        }

        info!(
            "Synthesized {} bytes of audio from {} fragment(s)",
            audio.len(),
            total
        );
        Ok(audio)
    }
}

/// Split `text` into whitespace-delimited chunks of at most `max_chars`
///
/// Words longer than `max_chars` are hard-split at character boundaries
/// so no fragment ever exceeds the upstream limit.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let mut piece = String::new();
            for (i, ch) in word.chars().enumerate() {
                piece.push(ch);
                if (i + 1) % max_chars == 0 {
                    chunks.push(std::mem::take(&mut piece));
                }
            }
            if !piece.is_empty() {
                chunks.push(piece);
            }
            continue;
        }

        // +1 accounts for the joining space
        let needed = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };

        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_len = needed;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
