// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image upload API endpoint module
//!
//! Provides POST /v1/upload for submitting an image and receiving its
//! generated caption.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{process_upload, upload_image_handler};
pub use request::UploadImagePayload;
pub use response::UploadImageResponse;
