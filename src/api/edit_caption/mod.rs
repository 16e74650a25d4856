// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Caption edit API endpoint module
//!
//! Provides POST /v1/caption for replacing a session's caption text.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::edit_caption_handler;
pub use request::EditCaptionRequest;
pub use response::EditCaptionResponse;
