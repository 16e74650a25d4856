// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Narration response types

use axum::http::header;
use axum::response::{IntoResponse, Response};

/// Synthesized narration returned as a raw MP3 body
#[derive(Debug, Clone)]
pub struct NarrateResponse {
    /// Complete MP3 byte stream for the caption
    pub audio: Vec<u8>,
}

impl IntoResponse for NarrateResponse {
    fn into_response(self) -> Response {
        // audio/mp3 is what the page's <audio> element is fed
        ([(header::CONTENT_TYPE, "audio/mp3")], self.audio).into_response()
    }
}
