// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared handlers: health, session inspection, story download, index page

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::server::AppState;
use crate::session::SessionState;
use crate::vision::image_utils::format_to_extension;

/// File name offered for the downloaded caption
pub const STORY_FILENAME: &str = "story.txt";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model: String,
    pub uptime_secs: u64,
    pub active_sessions: usize,
}

/// Image metadata as reported in session info
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMeta {
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfoResponse {
    pub session_id: Uuid,
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub word_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageMeta>,
    pub age_secs: u64,
}

/// GET /health - Service liveness and model identity
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::version::VERSION.to_string(),
        model: state.captioner.model_name().to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        active_sessions: state.store.len().await,
    })
}

/// GET /v1/session/:id - Current state of one caption session
pub async fn session_info_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionInfoResponse>, ApiError> {
    let info = state
        .store
        .read(id, |session| {
            Ok(SessionInfoResponse {
                session_id: session.id(),
                state: session.state(),
                caption: session.caption().map(|c| c.to_string()),
                word_count: session.word_count(),
                image: session.image_info().map(|i| ImageMeta {
                    width: i.width,
                    height: i.height,
                    format: format_to_extension(i.format).to_string(),
                    size_bytes: i.size_bytes,
                }),
                age_secs: session.age_secs(),
            })
        })
        .await?;

    Ok(Json(info))
}

/// GET /v1/story/:id - Download the caption as a plain text file
///
/// The body is exactly the caption text, byte for byte. The file is
/// offered as an attachment named `story.txt`.
pub async fn download_story_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let text = state
        .store
        .read(id, |session| session.story_text().map(|t| t.to_string()))
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", STORY_FILENAME),
            ),
        ],
        text,
    )
        .into_response())
}

/// GET / - The single page UI
pub async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}
