// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image upload payload extraction and validation

use bytes::Bytes;
use std::path::Path;
use uuid::Uuid;

use crate::api::errors::ApiError;

/// File extensions the upload control accepts
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Fields assembled from the multipart upload form
///
/// Not a serde type: the body arrives as multipart form data, so the
/// handler builds this by walking the fields.
#[derive(Debug, Clone)]
pub struct UploadImagePayload {
    /// Raw bytes of the uploaded file
    pub image: Bytes,
    /// Client-supplied file name, when the part carried one
    pub filename: Option<String>,
    /// Existing session to restart, or none to open a fresh one
    pub session_id: Option<Uuid>,
}

impl UploadImagePayload {
    /// Validate the upload before any decoding work
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.image.is_empty() {
            return Err(ApiError::ValidationError {
                field: "image".to_string(),
                message: "image file is required".to_string(),
            });
        }

        // Extension check mirrors the upload control's filter. Content is
        // still verified against magic bytes during decoding.
        if let Some(ref name) = self.filename {
            let ext = Path::new(name)
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase());

            match ext {
                Some(ref ext) if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) => {}
                Some(ext) => {
                    return Err(ApiError::ValidationError {
                        field: "image".to_string(),
                        message: format!(
                            "unsupported file type '{}', accepted: {:?}",
                            ext, ACCEPTED_EXTENSIONS
                        ),
                    });
                }
                None => {
                    return Err(ApiError::ValidationError {
                        field: "image".to_string(),
                        message: format!(
                            "file name '{}' has no extension, accepted: {:?}",
                            name, ACCEPTED_EXTENSIONS
                        ),
                    });
                }
            }
        }

        Ok(())
    }
}
