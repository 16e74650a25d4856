// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Narration endpoint handler

use axum::{extract::State, Json};
use tracing::info;

use super::request::NarrateRequest;
use super::response::NarrateResponse;
use crate::api::errors::ApiError;
use crate::api::server::AppState;

/// POST /v1/narrate - Speak a session's caption as MP3
///
/// Synthesis always runs against the caption text as it stands right now.
/// Nothing is cached, so narrating after an edit speaks the edited text.
pub async fn narrate_handler(
    State(state): State<AppState>,
    Json(request): Json<NarrateRequest>,
) -> Result<NarrateResponse, ApiError> {
    let text = state
        .store
        .read(request.session_id, |session| {
            session.caption_for_narration()
        })
        .await?;

    // The session lock is not held while the TTS request is in flight
    let audio = state.synthesizer.synthesize(&text).await?;

    state
        .store
        .update(request.session_id, |session| session.mark_narrated())
        .await?;

    info!(
        "Narrated session {} ({} bytes of audio)",
        request.session_id,
        audio.len()
    );

    Ok(NarrateResponse { audio })
}
