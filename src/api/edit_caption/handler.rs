// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Caption edit endpoint handler

use axum::{extract::State, Json};
use tracing::debug;

use super::request::EditCaptionRequest;
use super::response::EditCaptionResponse;
use crate::api::errors::ApiError;
use crate::api::server::AppState;

/// POST /v1/caption - Replace a session's caption text
///
/// The edit becomes the story text for download and narration. Editing
/// invalidates any previously generated narration. The text is taken
/// as-is; no length or character-set restriction applies.
pub async fn edit_caption_handler(
    State(state): State<AppState>,
    Json(request): Json<EditCaptionRequest>,
) -> Result<Json<EditCaptionResponse>, ApiError> {
    let (caption, word_count, session_state) = state
        .store
        .update(request.session_id, |session| {
            session.edit_caption(request.caption.clone())?;
            Ok((
                session.caption().unwrap_or_default().to_string(),
                session.word_count(),
                session.state(),
            ))
        })
        .await?;

    debug!(
        "Caption for session {} edited to {} word(s)",
        request.session_id, word_count
    );

    Ok(Json(EditCaptionResponse {
        session_id: request.session_id,
        caption,
        word_count,
        state: session_state,
    }))
}
