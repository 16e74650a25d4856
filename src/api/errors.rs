// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use crate::session::{SessionError, StoreError};
use crate::speech::SpeechError;
use crate::vision::{CaptionError, ImageError};

/// JSON error envelope returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    NotFound(String),
    InvalidRequest(String),
    PayloadTooLarge(String),
    ValidationError { field: String, message: String },
    InvalidState(String),
    EmptyCaption,
    CaptionFailed(String),
    SynthesisFailed(String),
    ServiceUnavailable(String),
    InternalError(String),
}

impl ApiError {
    pub fn to_response(&self, request_id: Option<String>) -> ErrorResponse {
        let (error, message, details) = match self {
            ApiError::NotFound(msg) => ("not_found", msg.clone(), None),
            ApiError::InvalidRequest(msg) => ("invalid_request", msg.clone(), None),
            ApiError::PayloadTooLarge(msg) => ("payload_too_large", msg.clone(), None),
            ApiError::ValidationError { field, message } => {
                let mut details = HashMap::new();
                details.insert(
                    "field".to_string(),
                    serde_json::Value::String(field.clone()),
                );
                ("validation_error", message.clone(), Some(details))
            }
            ApiError::InvalidState(msg) => ("invalid_state", msg.clone(), None),
            ApiError::EmptyCaption => (
                "empty_caption",
                "Cannot narrate an empty caption".to_string(),
                None,
            ),
            ApiError::CaptionFailed(msg) => ("caption_failed", msg.clone(), None),
            ApiError::SynthesisFailed(msg) => ("synthesis_failed", msg.clone(), None),
            ApiError::ServiceUnavailable(msg) => ("service_unavailable", msg.clone(), None),
            ApiError::InternalError(msg) => ("internal_error", msg.clone(), None),
        };

        ErrorResponse {
            error: error.to_string(),
            message,
            request_id,
            details,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::InvalidRequest(_) | ApiError::ValidationError { .. } => 400,
            ApiError::PayloadTooLarge(_) => 413,
            ApiError::InvalidState(_) => 409,
            ApiError::EmptyCaption => 422,
            ApiError::CaptionFailed(_) | ApiError::InternalError(_) => 500,
            ApiError::SynthesisFailed(_) => 502,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            ApiError::EmptyCaption => write!(f, "Cannot narrate an empty caption"),
            ApiError::CaptionFailed(msg) => write!(f, "Caption generation failed: {}", msg),
            ApiError::SynthesisFailed(msg) => write!(f, "Speech synthesis failed: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = self.to_response(Some(Uuid::new_v4().to_string()));
        (status, Json(body)).into_response()
    }
}

impl From<ImageError> for ApiError {
    fn from(e: ImageError) -> Self {
        ApiError::ValidationError {
            field: "image".to_string(),
            message: e.to_string(),
        }
    }
}

impl From<CaptionError> for ApiError {
    fn from(e: CaptionError) -> Self {
        match e {
            CaptionError::NotReady => {
                ApiError::ServiceUnavailable("Caption model not ready".to_string())
            }
            CaptionError::Inference(msg) => ApiError::CaptionFailed(msg),
        }
    }
}

impl From<SpeechError> for ApiError {
    fn from(e: SpeechError) -> Self {
        match e {
            SpeechError::EmptyText => ApiError::EmptyCaption,
            other => ApiError::SynthesisFailed(other.to_string()),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        ApiError::InvalidState(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => ApiError::NotFound(format!("Session {} not found", id)),
            StoreError::Capacity(n) => {
                ApiError::ServiceUnavailable(format!("Session limit reached ({} active)", n))
            }
            StoreError::Session(e) => ApiError::from(e),
        }
    }
}
