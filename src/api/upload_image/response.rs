// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image upload response types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::SessionState;
use crate::vision::image_utils::format_to_extension;
use crate::vision::ImageInfo;

/// Response after an image has been captioned
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageResponse {
    /// Session tracking this caption workflow
    pub session_id: Uuid,
    /// Generated one-sentence caption
    pub caption: String,
    /// Whitespace-delimited word count of the caption
    pub word_count: usize,
    /// Session state after the upload
    pub state: SessionState,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Detected image format extension
    pub format: String,
    /// Model used for captioning
    pub model: String,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

impl UploadImageResponse {
    /// Build the response from the session outcome and image metadata
    pub fn new(
        session_id: Uuid,
        caption: String,
        state: SessionState,
        info: &ImageInfo,
        model: &str,
        processing_time_ms: u64,
    ) -> Self {
        let word_count = caption.split_whitespace().count();
        Self {
            session_id,
            caption,
            word_count,
            state,
            width: info.width,
            height: info.height,
            format: format_to_extension(info.format).to_string(),
            model: model.to_string(),
            processing_time_ms,
        }
    }
}
