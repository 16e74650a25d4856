// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image upload endpoint handler

use axum::http::StatusCode;
use axum::{extract::State, Json};
use axum_extra::extract::multipart::MultipartError;
use axum_extra::extract::Multipart;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use super::request::UploadImagePayload;
use super::response::UploadImageResponse;
use crate::api::errors::ApiError;
use crate::api::server::AppState;
use crate::session::{CaptionSession, SessionState};
use crate::vision::decode_image_bytes;

/// POST /v1/upload - Caption an uploaded image
///
/// Accepts a multipart form with an `image` file part and an optional
/// `sessionId` text part. A matching session restarts its workflow with
/// the new image; otherwise a fresh session is opened.
pub async fn upload_image_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadImageResponse>, ApiError> {
    let mut image: Option<Bytes> = None;
    let mut filename: Option<String> = None;
    let mut session_id: Option<Uuid> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("image") => {
                filename = field.file_name().map(|s| s.to_string());
                let bytes = field.bytes().await.map_err(multipart_error)?;
                image = Some(bytes);
            }
            Some("sessionId") => {
                let text = field.text().await.map_err(multipart_error)?;
                let parsed = Uuid::parse_str(text.trim()).map_err(|_| ApiError::ValidationError {
                    field: "sessionId".to_string(),
                    message: format!("'{}' is not a valid session id", text.trim()),
                })?;
                session_id = Some(parsed);
            }
            // Unknown parts are ignored so form tweaks stay backwards compatible
            _ => {}
        }
    }

    let payload = UploadImagePayload {
        image: image.ok_or_else(|| ApiError::ValidationError {
            field: "image".to_string(),
            message: "multipart field 'image' is required".to_string(),
        })?,
        filename,
        session_id,
    };

    let response = process_upload(&state, payload).await?;
    Ok(Json(response))
}

/// Map multipart read failures, keeping body-limit rejections as 413
fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge("upload exceeds the configured body limit".to_string())
    } else {
        ApiError::InvalidRequest(format!("Malformed multipart body: {}", e))
    }
}

/// Decode, caption and record an upload
///
/// Split out of the extractor glue so tests can drive it directly with
/// assembled payloads.
pub async fn process_upload(
    state: &AppState,
    payload: UploadImagePayload,
) -> Result<UploadImageResponse, ApiError> {
    payload.validate()?;

    // Decoding and inference are CPU-bound, keep them off the async runtime
    let captioner = state.captioner.clone();
    let bytes = payload.image.clone();
    let (result, info) = tokio::task::spawn_blocking(move || -> Result<_, ApiError> {
        let (image, info) = decode_image_bytes(&bytes)?;
        let result = captioner.caption_image(&image)?;
        Ok((result, info))
    })
    .await
    .map_err(|e| ApiError::InternalError(format!("Caption task failed: {}", e)))??;

    info!(
        "Captioned {}x{} upload in {}ms: \"{}\"",
        info.width, info.height, result.processing_time_ms, result.caption
    );

    let session_id = match payload.session_id {
        Some(id) => {
            state
                .store
                .update(id, |session| {
                    session.attach_image(info.clone());
                    session.set_caption(result.caption.clone())
                })
                .await?;
            id
        }
        None => {
            let mut session = CaptionSession::new();
            session.attach_image(info.clone());
            session.set_caption(result.caption.clone())?;
            state.store.insert(session).await?
        }
    };

    Ok(UploadImageResponse::new(
        session_id,
        result.caption,
        SessionState::CaptionReady,
        &info,
        state.captioner.model_name(),
        result.processing_time_ms,
    ))
}
