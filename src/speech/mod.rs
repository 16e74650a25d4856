// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Speech synthesis module for caption narration

pub mod synthesizer;

pub use synthesizer::{chunk_text, SpeechError, SpeechSynthesizer, DEFAULT_TTS_ENDPOINT};
