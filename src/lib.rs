// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod session;
pub mod speech;
pub mod version;
pub mod vision;

pub use api::{build_router, serve, AppState};
pub use config::Config;
pub use session::{CaptionSession, SessionState, SessionStore};
pub use speech::{SpeechError, SpeechSynthesizer};
pub use vision::{
    load_captioner, BlipModel, CaptionModelConfig, CaptionResult, ImageCaptioner,
};
