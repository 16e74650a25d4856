// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod edit_caption;
pub mod errors;
pub mod handlers;
pub mod narrate;
pub mod server;
pub mod upload_image;

pub use edit_caption::{edit_caption_handler, EditCaptionRequest, EditCaptionResponse};
pub use errors::{ApiError, ErrorResponse};
pub use handlers::{
    download_story_handler, health_handler, index_handler, session_info_handler, HealthResponse,
    ImageMeta, SessionInfoResponse, STORY_FILENAME,
};
pub use narrate::{narrate_handler, NarrateRequest, NarrateResponse};
pub use server::{build_router, serve, spawn_eviction_task, AppState};
pub use upload_image::{process_upload, upload_image_handler, UploadImagePayload, UploadImageResponse};
